mod budget;
mod helpers;
mod plan;
mod pool;
mod rules;

pub(crate) use budget::{BudgetArgs, cmd_budget};
pub(crate) use helpers::json_error;
pub(crate) use plan::{PlanArgs, cmd_plan};
pub(crate) use pool::{cmd_complete, cmd_recipes};
pub(crate) use rules::cmd_rules;
