//! Policy Aggregate Root
//!
//! The Policy aggregate owns a policy's monetary state: what has been paid,
//! when the next installment falls due, and whether the policy is still
//! ACTIVE.
//!
//! # Invariants
//!
//! - `end_date` is `start_date` plus `term_years` whole years
//! - `installment_amount` is the integer split of `total_investment`
//! - `next_payment_date` only moves forward
//! - ACTIVE is the only non-terminal state; every transition leaves it
//!   exactly once

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::temporal::add_years;
use core_kernel::{AgentId, CustomerId, Money, PlanId, PolicyId};

use crate::error::PolicyError;
use crate::events::PolicyEvent;
use crate::schedule::{schedule_installments, PaymentInterval};

/// Policy lifecycle states
///
/// ```text
/// ACTIVE ──payment after end date──▶ EXPIRED
///   │ ──claim approved─────────────▶ CLAIMED
///   └ ──withdrawal approved────────▶ CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyStatus {
    Active,
    Expired,
    Claimed,
    Cancelled,
}

impl PolicyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Active => "ACTIVE",
            PolicyStatus::Expired => "EXPIRED",
            PolicyStatus::Claimed => "CLAIMED",
            PolicyStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PolicyStatus::Active)
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyStatus {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(PolicyStatus::Active),
            "EXPIRED" => Ok(PolicyStatus::Expired),
            "CLAIMED" => Ok(PolicyStatus::Claimed),
            "CANCELLED" => Ok(PolicyStatus::Cancelled),
            other => Err(PolicyError::validation(format!("unknown policy status {other}"))),
        }
    }
}

/// What happened when an installment was credited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallmentOutcome {
    /// The payment was taken after the end date and closed the policy
    pub expired: bool,
    pub next_payment_date: NaiveDate,
}

/// Flat persisted form of a policy
///
/// Adapters load rows into this shape and rehydrate with
/// [`Policy::from_record`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRecord {
    pub id: PolicyId,
    pub plan_id: PlanId,
    pub customer_id: CustomerId,
    pub agent_id: Option<AgentId>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub term_years: u32,
    pub total_investment: i64,
    pub payment_interval: PaymentInterval,
    pub installment_amount: i64,
    pub total_amount_paid: Money,
    pub next_payment_date: NaiveDate,
    pub status: PolicyStatus,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The Policy aggregate root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    id: PolicyId,
    plan_id: PlanId,
    customer_id: CustomerId,
    agent_id: Option<AgentId>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    term_years: u32,
    /// Whole currency units
    total_investment: i64,
    payment_interval: PaymentInterval,
    /// Whole currency units
    installment_amount: i64,
    total_amount_paid: Money,
    next_payment_date: NaiveDate,
    status: PolicyStatus,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<PolicyEvent>,
    /// Version for optimistic concurrency
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Policy {
    /// Rehydrates a policy from its persisted form
    pub fn from_record(record: PolicyRecord) -> Self {
        Self {
            id: record.id,
            plan_id: record.plan_id,
            customer_id: record.customer_id,
            agent_id: record.agent_id,
            start_date: record.start_date,
            end_date: record.end_date,
            term_years: record.term_years,
            total_investment: record.total_investment,
            payment_interval: record.payment_interval,
            installment_amount: record.installment_amount,
            total_amount_paid: record.total_amount_paid,
            next_payment_date: record.next_payment_date,
            status: record.status,
            events: Vec::new(),
            version: record.version,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    /// Flattens the policy for persistence
    pub fn to_record(&self) -> PolicyRecord {
        PolicyRecord {
            id: self.id,
            plan_id: self.plan_id,
            customer_id: self.customer_id,
            agent_id: self.agent_id,
            start_date: self.start_date,
            end_date: self.end_date,
            term_years: self.term_years,
            total_investment: self.total_investment,
            payment_interval: self.payment_interval,
            installment_amount: self.installment_amount,
            total_amount_paid: self.total_amount_paid,
            next_payment_date: self.next_payment_date,
            status: self.status,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn id(&self) -> PolicyId {
        self.id
    }

    pub fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    pub fn agent_id(&self) -> Option<AgentId> {
        self.agent_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn term_years(&self) -> u32 {
        self.term_years
    }

    pub fn total_investment(&self) -> i64 {
        self.total_investment
    }

    pub fn payment_interval(&self) -> PaymentInterval {
        self.payment_interval
    }

    pub fn installment_amount(&self) -> i64 {
        self.installment_amount
    }

    /// The installment as money
    pub fn installment(&self) -> Money {
        Money::from_units(self.installment_amount)
    }

    pub fn total_amount_paid(&self) -> Money {
        self.total_amount_paid
    }

    pub fn next_payment_date(&self) -> NaiveDate {
        self.next_payment_date
    }

    /// The persisted status
    pub fn status(&self) -> PolicyStatus {
        self.status
    }

    /// Status as of `today`
    ///
    /// Expiry is only persisted when a payment lands after the end date, so
    /// an ACTIVE policy past its end date reads as EXPIRED here.
    pub fn effective_status(&self, today: NaiveDate) -> PolicyStatus {
        if self.status == PolicyStatus::Active && today > self.end_date {
            PolicyStatus::Expired
        } else {
            self.status
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<PolicyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_active(&self) -> bool {
        self.status == PolicyStatus::Active
    }

    /// Fails unless the policy is still ACTIVE
    pub fn ensure_active(&self) -> Result<(), PolicyError> {
        if self.status.is_terminal() {
            return Err(PolicyError::AlreadyInTerminalState { status: self.status });
        }
        Ok(())
    }

    /// Credits one installment
    ///
    /// Adds the recorded installment amount to the amount paid, whatever the
    /// gateway actually charged, and moves the due date forward one interval.
    /// When `today` is already past the end date the policy expires.
    pub fn record_installment(&mut self, today: NaiveDate) -> Result<InstallmentOutcome, PolicyError> {
        self.ensure_active()?;

        let past_term = today > self.end_date;
        let next_payment_date = self.payment_interval.advance(self.next_payment_date)?;
        let now = Utc::now();

        self.total_amount_paid += self.installment();
        self.next_payment_date = next_payment_date;
        self.events.push(PolicyEvent::InstallmentRecorded {
            policy_id: self.id,
            installment: self.installment(),
            total_amount_paid: self.total_amount_paid,
            next_payment_date,
            timestamp: now,
        });

        if past_term {
            self.status = PolicyStatus::Expired;
            self.events.push(PolicyEvent::PolicyExpired {
                policy_id: self.id,
                end_date: self.end_date,
                timestamp: now,
            });
        }

        self.touch(now);
        Ok(InstallmentOutcome {
            expired: past_term,
            next_payment_date,
        })
    }

    /// Moves the policy to CLAIMED after a claim is approved
    pub fn mark_claimed(&mut self) -> Result<(), PolicyError> {
        self.ensure_active()?;
        let now = Utc::now();
        self.status = PolicyStatus::Claimed;
        self.events.push(PolicyEvent::PolicyClaimed {
            policy_id: self.id,
            timestamp: now,
        });
        self.touch(now);
        Ok(())
    }

    /// Moves the policy to CANCELLED after a withdrawal is approved
    pub fn cancel(&mut self) -> Result<(), PolicyError> {
        self.ensure_active()?;
        let now = Utc::now();
        self.status = PolicyStatus::Cancelled;
        self.events.push(PolicyEvent::PolicyCancelled {
            policy_id: self.id,
            timestamp: now,
        });
        self.touch(now);
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}

/// Builder for issuing new policies
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use core_kernel::{CustomerId, PlanId};
/// use domain_policy::{PaymentInterval, PolicyBuilder};
///
/// let policy = PolicyBuilder::new()
///     .plan(PlanId::new())
///     .customer(CustomerId::new())
///     .start_date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
///     .term_years(10)
///     .total_investment(100_000)
///     .payment_interval(PaymentInterval::Quarterly)
///     .build()
///     .unwrap();
///
/// assert_eq!(policy.installment_amount(), 2500);
/// assert_eq!(policy.end_date(), NaiveDate::from_ymd_opt(2035, 1, 1).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolicyBuilder {
    plan_id: Option<PlanId>,
    customer_id: Option<CustomerId>,
    agent_id: Option<AgentId>,
    start_date: Option<NaiveDate>,
    term_years: Option<u32>,
    total_investment: Option<i64>,
    payment_interval: Option<PaymentInterval>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plan(mut self, plan_id: PlanId) -> Self {
        self.plan_id = Some(plan_id);
        self
    }

    pub fn customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Sets the selling agent, if any
    pub fn agent(mut self, agent_id: Option<AgentId>) -> Self {
        self.agent_id = agent_id;
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn term_years(mut self, years: u32) -> Self {
        self.term_years = Some(years);
        self
    }

    pub fn total_investment(mut self, units: i64) -> Self {
        self.total_investment = Some(units);
        self
    }

    pub fn payment_interval(mut self, interval: PaymentInterval) -> Self {
        self.payment_interval = Some(interval);
        self
    }

    /// Issues the policy
    ///
    /// The first installment is due on the start date and nothing has been
    /// paid yet.
    pub fn build(self) -> Result<Policy, PolicyError> {
        let plan_id = self.plan_id.ok_or_else(|| missing("plan_id"))?;
        let customer_id = self.customer_id.ok_or_else(|| missing("customer_id"))?;
        let start_date = self.start_date.ok_or_else(|| missing("start_date"))?;
        let term_years = self.term_years.ok_or_else(|| missing("term_years"))?;
        let total_investment = self.total_investment.ok_or_else(|| missing("total_investment"))?;
        let payment_interval = self.payment_interval.ok_or_else(|| missing("payment_interval"))?;

        let schedule = schedule_installments(total_investment, term_years, payment_interval)?;
        let end_date = add_years(start_date, term_years)?;
        let id = PolicyId::new_v7();
        let now = Utc::now();

        Ok(Policy {
            id,
            plan_id,
            customer_id,
            agent_id: self.agent_id,
            start_date,
            end_date,
            term_years,
            total_investment,
            payment_interval,
            installment_amount: schedule.installment_amount,
            total_amount_paid: Money::zero(),
            next_payment_date: start_date,
            status: PolicyStatus::Active,
            events: vec![PolicyEvent::PolicyIssued {
                policy_id: id,
                start_date,
                end_date,
                timestamp: now,
            }],
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }
}

fn missing(field: &str) -> PolicyError {
    PolicyError::MissingRequiredField(field.to_string())
}
