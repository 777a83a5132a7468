//! An engine wired to in-memory adapters and a pinned clock

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{FixedClock, Money, PlanId, PolicyId, PortError};
use domain_billing::{
    CapturedCharge, ChargeConfirmation, MockPaymentGateway, MockSettingsPort, NewInsuranceSetting,
    NewTaxSetting, PaymentGateway, SettingsPort,
};
use domain_claims::MockDocumentPort;
use domain_party::{Admin, Agent, Customer, MockPartyPort, PartyPort, VerificationStatus};
use domain_policy::{CatalogPort, InsurancePlan, InsuranceScheme, MockCatalogPort, PlanWithScheme};

use crate::config::EngineConfig;
use crate::engine::{LifecycleEngine, LifecyclePorts};
use crate::notification::mock::MockNotifier;
use crate::store::mock::MockLifecycleStore;

/// Engine plus direct handles on every mock behind it
pub struct Harness {
    pub engine: LifecycleEngine,
    pub clock: FixedClock,
    pub parties: MockPartyPort,
    pub catalog: MockCatalogPort,
    pub settings: MockSettingsPort,
    pub documents: MockDocumentPort,
    pub gateway: MockPaymentGateway,
    pub store: MockLifecycleStore,
    pub notifier: MockNotifier,
}

impl Harness {
    /// A harness whose clock reads `today`
    pub fn on(today: NaiveDate) -> Self {
        Self::with_notifier(today, MockNotifier::new())
    }

    pub fn with_notifier(today: NaiveDate, notifier: MockNotifier) -> Self {
        let clock = FixedClock::on(today);
        let parties = MockPartyPort::new();
        let catalog = MockCatalogPort::new();
        let settings = MockSettingsPort::new();
        let documents = MockDocumentPort::new();
        let gateway = MockPaymentGateway::new();
        let store = MockLifecycleStore::new();

        let ports = LifecyclePorts {
            parties: Arc::new(parties.clone()),
            catalog: Arc::new(catalog.clone()),
            settings: Arc::new(settings.clone()),
            documents: Arc::new(documents.clone()),
            gateway: Arc::new(gateway.clone()),
            store: Arc::new(store.clone()),
            notifier: Arc::new(notifier.clone()),
        };
        let engine = LifecycleEngine::new(ports, Arc::new(clock.clone()), EngineConfig::default());

        Self {
            engine,
            clock,
            parties,
            catalog,
            settings,
            documents,
            gateway,
            store,
            notifier,
        }
    }

    /// Stores an approved, active customer born on `date_of_birth`
    pub async fn customer_born(&self, date_of_birth: NaiveDate) -> Result<Customer, PortError> {
        let customer = Customer::new("Asha", "Rao", "asha.rao@example.com", date_of_birth)
            .with_verification(VerificationStatus::Approved);
        self.parties.save_customer(customer).await
    }

    /// Stores an approved 30-year-old customer
    pub async fn customer(&self) -> Result<Customer, PortError> {
        let born = NaiveDate::from_ymd_opt(1994, 1, 1).unwrap_or_default();
        self.customer_born(born).await
    }

    pub async fn agent(&self) -> Result<Agent, PortError> {
        self.parties
            .save_agent(Agent::new("Vikram", "Singh", "vikram.singh@example.com"))
            .await
    }

    pub async fn admin(&self) -> Result<Admin, PortError> {
        self.parties.save_admin(Admin::new("Meera Iyer")).await
    }

    /// Stores a plan open to ages 18..=60, terms 5..=20 years and investments
    /// 10_000..=1_000_000, under a scheme paying 5% commission with a 10%
    /// withdrawal penalty
    pub async fn plan(&self) -> Result<PlanWithScheme, PortError> {
        self.plan_under(dec!(5), dec!(10)).await
    }

    pub async fn plan_under(
        &self,
        commission: Decimal,
        withdrawal_penalty: Decimal,
    ) -> Result<PlanWithScheme, PortError> {
        let scheme = self
            .catalog
            .save_scheme(InsuranceScheme::new("Secure Growth", commission, withdrawal_penalty))
            .await?;
        let plan = self
            .catalog
            .save_plan(InsurancePlan {
                id: PlanId::new_v7(),
                scheme_id: scheme.id,
                name: "Secure Growth 20".to_string(),
                min_term_years: 5,
                max_term_years: 20,
                min_age: 18,
                max_age: 60,
                min_investment: 10_000,
                max_investment: 1_000_000,
                profit_ratio: dec!(1.2),
                active: true,
            })
            .await?;
        Ok(PlanWithScheme { plan, scheme })
    }

    /// Publishes tax and insurance snapshots, all in percent
    pub async fn rates(
        &self,
        tax: Decimal,
        claim_deduction: Decimal,
        withdrawal_penalty: Decimal,
        late_penalty: Decimal,
    ) -> Result<(), PortError> {
        self.settings
            .publish_tax_setting(NewTaxSetting {
                tax_percentage: tax,
            })
            .await?;
        self.settings
            .publish_insurance_setting(NewInsuranceSetting {
                claim_deduction,
                withdrawal_penalty,
                late_penalty,
            })
            .await?;
        Ok(())
    }

    /// Captures a successful charge at the gateway
    pub async fn capture(&self, policy_id: PolicyId, amount: Money) -> ChargeConfirmation {
        self.gateway.capture(policy_id, amount).await
    }

    /// Records a charge the gateway reports as failed
    pub async fn failed_capture(
        &self,
        policy_id: PolicyId,
        amount: Money,
    ) -> Result<ChargeConfirmation, PortError> {
        let charge_id = format!("ch_failed_{}", policy_id.as_uuid().simple());
        self.gateway
            .record_capture(CapturedCharge {
                charge_id: charge_id.clone(),
                policy_id,
                amount,
                succeeded: false,
                captured_at: chrono::Utc::now(),
            })
            .await?;
        Ok(ChargeConfirmation { charge_id })
    }
}
