//! Tagged ledger commands accepted by `POST /commands`.
//!
//! A command is checked with [`LedgerCommand::validate`] before it reaches
//! the ledger, so malformed input never opens a database transaction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LedgerCommand {
    CreateAccount {
        name: String,
        account_type: String,
        category: String,
        #[serde(default)]
        opening_balance_minor: i64,
    },
    ApplyTransaction {
        account_id: Uuid,
        amount_minor: i64,
        description: String,
        category: String,
        #[serde(default)]
        date: Option<NaiveDate>,
    },
    SetAccountBalance {
        account_id: Uuid,
        balance_minor: i64,
        #[serde(default)]
        note: Option<String>,
    },
    UpsertGoal {
        #[serde(default)]
        id: Option<Uuid>,
        title: String,
        life_category: String,
        target_minor: i64,
        #[serde(default)]
        target_date: Option<NaiveDate>,
        #[serde(default)]
        metric: Option<String>,
    },
    UpdateGoalProgress {
        /// Goal id or title.
        goal: String,
        current_minor: i64,
    },
    LogRevenue {
        amount_minor: i64,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        business_line: Option<String>,
        #[serde(default)]
        client: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOutcome {
    pub op: String,
    pub id: Option<Uuid>,
}

fn require_text(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

impl LedgerCommand {
    pub fn op(&self) -> &'static str {
        match self {
            Self::CreateAccount { .. } => "create_account",
            Self::ApplyTransaction { .. } => "apply_transaction",
            Self::SetAccountBalance { .. } => "set_account_balance",
            Self::UpsertGoal { .. } => "upsert_goal",
            Self::UpdateGoalProgress { .. } => "update_goal_progress",
            Self::LogRevenue { .. } => "log_revenue",
        }
    }

    /// Shape checks that need no storage: required text, signs of amounts.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::CreateAccount {
                name,
                account_type,
                category,
                ..
            } => {
                require_text(name, "name")?;
                require_text(account_type, "account_type")?;
                require_text(category, "category")
            }
            Self::ApplyTransaction {
                amount_minor,
                description,
                category,
                ..
            } => {
                if *amount_minor == 0 {
                    return Err("amount_minor must not be zero".to_string());
                }
                require_text(description, "description")?;
                require_text(category, "category")
            }
            Self::SetAccountBalance { .. } => Ok(()),
            Self::UpsertGoal {
                title,
                life_category,
                target_minor,
                ..
            } => {
                require_text(title, "title")?;
                require_text(life_category, "life_category")?;
                if *target_minor < 0 {
                    return Err("target_minor must be >= 0".to_string());
                }
                Ok(())
            }
            Self::UpdateGoalProgress { goal, .. } => require_text(goal, "goal"),
            Self::LogRevenue { amount_minor, .. } => {
                if *amount_minor <= 0 {
                    return Err("amount_minor must be > 0".to_string());
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tagged_commands() {
        let cmd: LedgerCommand = serde_json::from_str(
            r#"{"op":"log_revenue","amount_minor":120000,"client":"Acme"}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            LedgerCommand::LogRevenue {
                amount_minor: 120_000,
                description: None,
                business_line: None,
                client: Some("Acme".to_string()),
            }
        );
        assert_eq!(cmd.op(), "log_revenue");
    }

    #[test]
    fn unknown_op_is_rejected() {
        let res = serde_json::from_str::<LedgerCommand>(r#"{"op":"drop_tables"}"#);
        assert!(res.is_err());
    }

    #[test]
    fn validate_catches_shape_errors() {
        let zero = LedgerCommand::ApplyTransaction {
            account_id: Uuid::new_v4(),
            amount_minor: 0,
            description: "x".to_string(),
            category: "income".to_string(),
            date: None,
        };
        assert!(zero.validate().is_err());

        let blank_goal = LedgerCommand::UpdateGoalProgress {
            goal: "  ".to_string(),
            current_minor: 5,
        };
        assert_eq!(blank_goal.validate(), Err("goal must not be empty".to_string()));

        let refund = LedgerCommand::LogRevenue {
            amount_minor: -5,
            description: None,
            business_line: None,
            client: None,
        };
        assert!(refund.validate().is_err());
    }
}
