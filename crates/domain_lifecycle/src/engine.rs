//! The policy financial lifecycle engine
//!
//! Every operation is request-driven and runs to completion before it
//! returns. Checks happen first and nothing is persisted until they pass;
//! each state change is then written through one atomic [`LifecycleStore`]
//! call. Notifications go out after the write and cannot undo it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{
    AdminId, AgentId, ClaimId, Clock, CustomerId, DocumentId, PlanId, PolicyId, WithdrawalId,
};
use domain_billing::{
    apply_payment, calculate_due, AmountDue, ChargeConfirmation, DueInputs, InsuranceSetting,
    NewInsuranceSetting, NewTaxSetting, PaymentGateway, SettingsPort, SettingsSnapshot, TaxSetting,
    Transaction,
};
use domain_claims::{claim_payout, Claim, DocumentPort, NewClaim};
use domain_party::{Customer, PartyPort};
use domain_policy::{
    check_eligibility, commission_lines, summarize, CatalogPort, CommissionLine,
    CommissionSummary, EligibilityRequest, PaymentInterval, PlanWithScheme, Policy,
    PolicyBuilder,
};
use domain_withdrawal::{withdrawal_payout, NewWithdrawalRequest, WithdrawalRequest};

use crate::config::EngineConfig;
use crate::error::LifecycleError;
use crate::notification::{Notification, NotificationPort, Recipient};
use crate::store::{LifecycleStore, PolicyUpdate};
use crate::views::{
    ClaimResolution, CurrentSettings, PaymentReceipt, PolicyView, WithdrawalResolution,
};

/// The collaborators the engine works through
#[derive(Clone)]
pub struct LifecyclePorts {
    pub parties: Arc<dyn PartyPort>,
    pub catalog: Arc<dyn CatalogPort>,
    pub settings: Arc<dyn SettingsPort>,
    pub documents: Arc<dyn DocumentPort>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub store: Arc<dyn LifecycleStore>,
    pub notifier: Arc<dyn NotificationPort>,
}

/// A customer's application for a new policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyApplication {
    pub customer_id: CustomerId,
    pub plan_id: PlanId,
    pub term_years: u32,
    /// Whole currency units
    pub total_investment: i64,
    pub payment_interval: PaymentInterval,
    pub agent_id: Option<AgentId>,
}

/// A customer's claim on one of their policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSubmission {
    pub policy_id: PolicyId,
    pub explanation: String,
    #[serde(default)]
    pub document_ids: Vec<DocumentId>,
}

/// Application service over the policy, billing, claim and withdrawal domains
#[derive(Clone)]
pub struct LifecycleEngine {
    ports: LifecyclePorts,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl LifecycleEngine {
    pub fn new(ports: LifecyclePorts, clock: Arc<dyn Clock>, config: EngineConfig) -> Self {
        Self {
            ports,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn ports(&self) -> &LifecyclePorts {
        &self.ports
    }

    /// Today in the business timezone
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // ------------------------------------------------------------------
    // Issuance
    // ------------------------------------------------------------------

    /// Issues a policy starting today
    #[instrument(skip_all, fields(customer_id = %application.customer_id, plan_id = %application.plan_id))]
    pub async fn create_policy(&self, application: PolicyApplication) -> Result<Policy, LifecycleError> {
        let customer = self.ports.parties.get_customer(application.customer_id).await?;
        if !customer.active {
            return Err(LifecycleError::unauthorized(format!(
                "customer {} is inactive",
                customer.id
            )));
        }

        let offer = self.ports.catalog.get_plan_with_scheme(application.plan_id).await?;

        if let Some(agent_id) = application.agent_id {
            let agent = self.ports.parties.get_agent(agent_id).await?;
            if !agent.active {
                return Err(LifecycleError::validation(format!("agent {agent_id} is inactive")));
            }
        }

        let today = self.clock.today();
        check_eligibility(
            &customer,
            &offer.plan,
            EligibilityRequest {
                term_years: application.term_years,
                total_investment: application.total_investment,
            },
            today,
        )?;

        let mut policy = PolicyBuilder::new()
            .plan(offer.plan.id)
            .customer(customer.id)
            .agent(application.agent_id)
            .start_date(today)
            .term_years(application.term_years)
            .total_investment(application.total_investment)
            .payment_interval(application.payment_interval)
            .build()?;

        self.ports.store.insert_policy(&policy).await?;
        log_events(&mut policy);

        info!(
            policy_id = %policy.id(),
            installment = policy.installment_amount(),
            interval = %policy.payment_interval(),
            "Policy issued"
        );
        Ok(policy)
    }

    // ------------------------------------------------------------------
    // Installments
    // ------------------------------------------------------------------

    /// Amount due for the next installment, including tax and any late penalty
    #[instrument(skip_all, fields(policy_id = %policy_id))]
    pub async fn quote_installment(&self, policy_id: PolicyId) -> Result<AmountDue, LifecycleError> {
        let policy = self.ports.store.get_policy(policy_id).await?;
        policy.ensure_active()?;

        let settings = self.settings_snapshot().await?;
        let due = calculate_due(DueInputs {
            installment: policy.installment(),
            next_payment_date: policy.next_payment_date(),
            today: self.clock.today(),
            tax: settings.tax,
            late_penalty: settings.late_penalty,
            minimum_payable: self.config.minimum_payable,
        })?;

        debug!(total = %due.total, overdue = due.overdue, "Installment quoted");
        Ok(due)
    }

    /// Applies a gateway-captured charge to a policy
    ///
    /// The charge is looked up in the gateway's capture registry; the client
    /// only supplies its id.
    #[instrument(skip_all, fields(policy_id = %policy_id, charge_id = %confirmation.charge_id))]
    pub async fn confirm_payment(
        &self,
        policy_id: PolicyId,
        confirmation: ChargeConfirmation,
    ) -> Result<PaymentReceipt, LifecycleError> {
        let mut policy = self.ports.store.get_policy(policy_id).await?;

        let capture = self
            .ports
            .gateway
            .verify_capture(&confirmation)
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    LifecycleError::PaymentNotCaptured(format!(
                        "no capture recorded for charge {}",
                        confirmation.charge_id
                    ))
                } else {
                    err.into()
                }
            })?;
        if capture.policy_id != policy_id {
            return Err(LifecycleError::unauthorized(format!(
                "charge {} was captured for another policy",
                capture.charge_id
            )));
        }

        let expected_version = policy.version();
        let applied = apply_payment(&mut policy, &capture, self.clock.today(), self.clock.now())?;

        self.ports
            .store
            .record_payment(&applied.transaction, PolicyUpdate::new(&policy, expected_version))
            .await?;
        log_events(&mut policy);

        info!(
            transaction_id = %applied.transaction.id,
            amount = %applied.transaction.amount,
            total_paid = %policy.total_amount_paid(),
            next_payment_date = %policy.next_payment_date(),
            expired = applied.expired,
            "Payment confirmed"
        );

        if applied.expired {
            self.notify_maturity(&policy).await;
        }

        Ok(PaymentReceipt {
            policy: PolicyView::new(&policy, self.clock.today()),
            transaction: applied.transaction,
            expired: applied.expired,
        })
    }

    // ------------------------------------------------------------------
    // Claims
    // ------------------------------------------------------------------

    /// Files a claim on a policy the customer owns
    #[instrument(skip_all, fields(customer_id = %customer_id, policy_id = %submission.policy_id))]
    pub async fn submit_claim(
        &self,
        customer_id: CustomerId,
        submission: ClaimSubmission,
    ) -> Result<Claim, LifecycleError> {
        let policy = self.ports.store.get_policy(submission.policy_id).await?;
        let customer = self.ports.parties.get_customer(customer_id).await?;
        ensure_owner(&customer, &policy)?;
        policy.ensure_active()?;

        let new_claim = NewClaim {
            policy_id: policy.id(),
            customer_id,
            explanation: submission.explanation,
            document_ids: submission.document_ids,
            submitted_at: self.clock.now(),
        };
        new_claim.validate()?;
        self.ports
            .documents
            .ensure_documents_exist(&new_claim.document_ids)
            .await?;

        let claim = self.ports.store.insert_claim(new_claim).await?;
        info!(claim_id = %claim.id, "Claim submitted");
        Ok(claim)
    }

    /// Approves a pending claim and marks its policy CLAIMED
    #[instrument(skip_all, fields(claim_id = %claim_id, admin_id = %admin_id))]
    pub async fn approve_claim(
        &self,
        claim_id: ClaimId,
        admin_id: AdminId,
    ) -> Result<ClaimResolution, LifecycleError> {
        self.ensure_admin(admin_id).await?;
        let mut claim = self.ports.store.get_claim(claim_id).await?;
        let mut policy = self.ports.store.get_policy(claim.policy_id).await?;
        let expected_version = policy.version();

        claim.approve(admin_id, self.clock.now())?;
        policy.mark_claimed()?;
        // Read before the write so a settings outage leaves nothing committed
        let settings = self.settings_snapshot().await?;

        self.ports
            .store
            .resolve_claim(&claim, Some(PolicyUpdate::new(&policy, expected_version)))
            .await?;
        log_events(&mut policy);

        let payout = claim_payout(policy.total_investment(), settings.claim_deduction);
        info!(policy_id = %policy.id(), payout = %payout, "Claim approved");

        if let Some(recipient) = self.recipient(claim.customer_id).await {
            self.notify(Notification::ClaimApproved {
                recipient,
                claim_id,
                policy_id: policy.id(),
                payout,
            })
            .await;
        }

        Ok(ClaimResolution {
            claim,
            payout: Some(payout),
        })
    }

    /// Rejects a pending claim; the policy is left as it is
    #[instrument(skip_all, fields(claim_id = %claim_id, admin_id = %admin_id))]
    pub async fn reject_claim(
        &self,
        claim_id: ClaimId,
        admin_id: AdminId,
    ) -> Result<ClaimResolution, LifecycleError> {
        self.ensure_admin(admin_id).await?;
        let mut claim = self.ports.store.get_claim(claim_id).await?;

        claim.reject(admin_id, self.clock.now())?;
        self.ports.store.resolve_claim(&claim, None).await?;
        info!(policy_id = %claim.policy_id, "Claim rejected");

        if let Some(recipient) = self.recipient(claim.customer_id).await {
            self.notify(Notification::ClaimRejected {
                recipient,
                claim_id,
                policy_id: claim.policy_id,
            })
            .await;
        }

        Ok(ClaimResolution { claim, payout: None })
    }

    // ------------------------------------------------------------------
    // Withdrawals
    // ------------------------------------------------------------------

    /// Asks to exit a policy early
    #[instrument(skip_all, fields(customer_id = %customer_id, policy_id = %policy_id))]
    pub async fn request_withdrawal(
        &self,
        customer_id: CustomerId,
        policy_id: PolicyId,
    ) -> Result<WithdrawalRequest, LifecycleError> {
        let policy = self.ports.store.get_policy(policy_id).await?;
        let customer = self.ports.parties.get_customer(customer_id).await?;
        ensure_owner(&customer, &policy)?;
        policy.ensure_active()?;

        let request = self
            .ports
            .store
            .insert_withdrawal(NewWithdrawalRequest {
                policy_id,
                customer_id,
                requested_at: self.clock.now(),
            })
            .await?;
        info!(request_id = %request.id, "Withdrawal requested");
        Ok(request)
    }

    /// Approves a pending withdrawal and cancels its policy
    #[instrument(skip_all, fields(request_id = %request_id, admin_id = %admin_id))]
    pub async fn approve_withdrawal(
        &self,
        request_id: WithdrawalId,
        admin_id: AdminId,
    ) -> Result<WithdrawalResolution, LifecycleError> {
        self.ensure_admin(admin_id).await?;
        let mut request = self.ports.store.get_withdrawal(request_id).await?;
        let mut policy = self.ports.store.get_policy(request.policy_id).await?;
        let expected_version = policy.version();

        request.approve(admin_id, self.clock.now())?;
        policy.cancel()?;
        let settings = self.settings_snapshot().await?;

        self.ports
            .store
            .resolve_withdrawal(&request, Some(PolicyUpdate::new(&policy, expected_version)))
            .await?;
        log_events(&mut policy);

        let payout = withdrawal_payout(policy.total_amount_paid(), settings.withdrawal_penalty);
        info!(policy_id = %policy.id(), payout = %payout, "Withdrawal approved");

        if let Some(recipient) = self.recipient(request.customer_id).await {
            self.notify(Notification::WithdrawalApproved {
                recipient,
                request_id,
                policy_id: policy.id(),
                payout,
            })
            .await;
        }

        Ok(WithdrawalResolution {
            request,
            payout: Some(payout),
        })
    }

    /// Rejects a pending withdrawal; the policy is left as it is
    #[instrument(skip_all, fields(request_id = %request_id, admin_id = %admin_id))]
    pub async fn reject_withdrawal(
        &self,
        request_id: WithdrawalId,
        admin_id: AdminId,
    ) -> Result<WithdrawalResolution, LifecycleError> {
        self.ensure_admin(admin_id).await?;
        let mut request = self.ports.store.get_withdrawal(request_id).await?;

        request.reject(admin_id, self.clock.now())?;
        self.ports.store.resolve_withdrawal(&request, None).await?;
        info!(policy_id = %request.policy_id, "Withdrawal rejected");

        if let Some(recipient) = self.recipient(request.customer_id).await {
            self.notify(Notification::WithdrawalRejected {
                recipient,
                request_id,
                policy_id: request.policy_id,
            })
            .await;
        }

        Ok(WithdrawalResolution {
            request,
            payout: None,
        })
    }

    // ------------------------------------------------------------------
    // Commissions
    // ------------------------------------------------------------------

    /// One line per policy the agent sold
    #[instrument(skip_all, fields(agent_id = %agent_id))]
    pub async fn agent_commissions(&self, agent_id: AgentId) -> Result<Vec<CommissionLine>, LifecycleError> {
        self.ports.parties.get_agent(agent_id).await?;
        let policies = self.ports.store.policies_by_agent(agent_id).await?;

        let mut offers: HashMap<PlanId, PlanWithScheme> = HashMap::new();
        for policy in &policies {
            if !offers.contains_key(&policy.plan_id()) {
                let offer = self.ports.catalog.get_plan_with_scheme(policy.plan_id()).await?;
                offers.insert(policy.plan_id(), offer);
            }
        }

        Ok(commission_lines(
            policies
                .iter()
                .filter_map(|policy| offers.get(&policy.plan_id()).map(|offer| (policy, offer))),
        ))
    }

    /// Dashboard totals for an agent
    #[instrument(skip_all, fields(agent_id = %agent_id))]
    pub async fn agent_commission_summary(
        &self,
        agent_id: AgentId,
    ) -> Result<CommissionSummary, LifecycleError> {
        let lines = self.agent_commissions(agent_id).await?;
        let approved = self
            .ports
            .store
            .count_approved_withdrawals_for_agent(agent_id)
            .await?;
        Ok(summarize(&lines, approved))
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    #[instrument(skip_all, fields(policy_id = %policy_id))]
    pub async fn policy_by_id(&self, policy_id: PolicyId) -> Result<PolicyView, LifecycleError> {
        let policy = self.ports.store.get_policy(policy_id).await?;
        Ok(PolicyView::new(&policy, self.clock.today()))
    }

    #[instrument(skip_all, fields(customer_id = %customer_id))]
    pub async fn policies_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<PolicyView>, LifecycleError> {
        let today = self.clock.today();
        let policies = self.ports.store.policies_by_customer(customer_id).await?;
        Ok(policies.iter().map(|p| PolicyView::new(p, today)).collect())
    }

    #[instrument(skip_all, fields(agent_id = %agent_id))]
    pub async fn policies_by_agent(&self, agent_id: AgentId) -> Result<Vec<PolicyView>, LifecycleError> {
        let today = self.clock.today();
        let policies = self.ports.store.policies_by_agent(agent_id).await?;
        Ok(policies.iter().map(|p| PolicyView::new(p, today)).collect())
    }

    /// The append-only payment log of a policy
    #[instrument(skip_all, fields(policy_id = %policy_id))]
    pub async fn transactions_for_policy(
        &self,
        policy_id: PolicyId,
    ) -> Result<Vec<Transaction>, LifecycleError> {
        self.ports.store.get_policy(policy_id).await?;
        Ok(self.ports.store.transactions_for_policy(policy_id).await?)
    }

    #[instrument(skip_all, fields(customer_id = %customer_id))]
    pub async fn claims_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Claim>, LifecycleError> {
        Ok(self.ports.store.claims_for_customer(customer_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn pending_claims(&self) -> Result<Vec<Claim>, LifecycleError> {
        Ok(self.ports.store.pending_claims().await?)
    }

    #[instrument(skip_all, fields(agent_id = %agent_id))]
    pub async fn withdrawals_for_agent(
        &self,
        agent_id: AgentId,
    ) -> Result<Vec<WithdrawalRequest>, LifecycleError> {
        Ok(self.ports.store.withdrawals_for_agent(agent_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn pending_withdrawals(&self) -> Result<Vec<WithdrawalRequest>, LifecycleError> {
        Ok(self.ports.store.pending_withdrawals().await?)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Appends a new tax snapshot, which becomes current
    #[instrument(skip(self))]
    pub async fn publish_tax_setting(&self, setting: NewTaxSetting) -> Result<TaxSetting, LifecycleError> {
        setting.validate()?;
        let published = self.ports.settings.publish_tax_setting(setting).await?;
        info!(setting_id = %published.id, tax = %published.tax_percentage, "Tax setting published");
        Ok(published)
    }

    /// Appends a new insurance snapshot, which becomes current
    #[instrument(skip(self))]
    pub async fn publish_insurance_setting(
        &self,
        setting: NewInsuranceSetting,
    ) -> Result<InsuranceSetting, LifecycleError> {
        setting.validate()?;
        let published = self.ports.settings.publish_insurance_setting(setting).await?;
        info!(setting_id = %published.id, "Insurance setting published");
        Ok(published)
    }

    #[instrument(skip(self))]
    pub async fn current_settings(&self) -> Result<CurrentSettings, LifecycleError> {
        Ok(CurrentSettings {
            tax: self.ports.settings.current_tax_setting().await?,
            insurance: self.ports.settings.current_insurance_setting().await?,
        })
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    async fn settings_snapshot(&self) -> Result<SettingsSnapshot, LifecycleError> {
        let current = self.current_settings().await?;
        if current.tax.is_none() {
            warn!("No tax setting published, using 0%");
        }
        if current.insurance.is_none() {
            warn!("No insurance setting published, using 0% for all rates");
        }
        Ok(SettingsSnapshot::from_rows(
            current.tax.as_ref(),
            current.insurance.as_ref(),
        ))
    }

    async fn ensure_admin(&self, admin_id: AdminId) -> Result<(), LifecycleError> {
        match self.ports.parties.get_admin(admin_id).await {
            Ok(admin) if admin.active => Ok(()),
            Ok(_) => Err(LifecycleError::unauthorized(format!("admin {admin_id} is inactive"))),
            Err(err) if err.is_not_found() => Err(LifecycleError::unauthorized(format!(
                "{admin_id} is not an admin"
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn recipient(&self, customer_id: CustomerId) -> Option<Recipient> {
        match self.ports.parties.get_customer(customer_id).await {
            Ok(customer) => Some(Recipient {
                name: customer.full_name(),
                email: customer.email,
            }),
            Err(err) => {
                warn!(customer_id = %customer_id, error = %err, "Cannot address notification");
                None
            }
        }
    }

    async fn notify_maturity(&self, policy: &Policy) {
        let plan = match self.ports.catalog.get_plan(policy.plan_id()).await {
            Ok(plan) => plan,
            Err(err) => {
                warn!(policy_id = %policy.id(), error = %err, "Cannot estimate maturity payout");
                return;
            }
        };
        if let Some(recipient) = self.recipient(policy.customer_id()).await {
            self.notify(Notification::PolicyMatured {
                recipient,
                policy_id: policy.id(),
                maturity_payout: plan.maturity_payout(policy.total_investment()),
            })
            .await;
        }
    }

    async fn notify(&self, notification: Notification) {
        if let Err(err) = self
            .ports
            .notifier
            .send(&self.config.company_name, &notification)
            .await
        {
            warn!(kind = notification.kind(), error = %err, "Notification failed");
        }
    }
}

fn ensure_owner(customer: &Customer, policy: &Policy) -> Result<(), LifecycleError> {
    if !customer.active {
        return Err(LifecycleError::unauthorized(format!(
            "customer {} is inactive",
            customer.id
        )));
    }
    if policy.customer_id() != customer.id {
        return Err(LifecycleError::unauthorized(format!(
            "customer {} does not own policy {}",
            customer.id,
            policy.id()
        )));
    }
    Ok(())
}

fn log_events(policy: &mut Policy) {
    for event in policy.take_events() {
        debug!(policy_id = %event.policy_id(), event = event.event_type(), "Policy event");
    }
}
