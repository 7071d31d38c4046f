//! Alias resolution and condition grouping.
//!
//! Tokens are resolved against an [`AliasConfig`] and numbered into groups in
//! a single forward pass:
//!
//! - the main parameter opens the next group (the first main hit joins the
//!   group already in progress, so leading auxiliary tokens belong to it);
//! - a canonical parameter seen again in the current group overflows that
//!   token, and everything after it, into the next group.
//!
//! ```text
//! card A  qty>=2  card B  qty>=1  qty<=3
//!   1       1       2       2       3      (second qty overflows)
//! ```
//!
//! Group numbers only ever advance by one, so they stay contiguous from 1.
//! Unresolved parameters are kept (validity is the evaluator's concern) and
//! never trigger overflow.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::config::AliasConfig;
use crate::{ComparisonToken, Condition, Parameter, Value};

/// Resolve and group `tokens`. Returns conditions in input order.
pub fn group(tokens: &[ComparisonToken], config: &AliasConfig) -> Vec<Condition> {
    let main = config.main().canonical();

    let mut current = 1u32;
    let mut main_seen = false;
    let mut last_group: HashMap<String, u32> = HashMap::new();
    let mut conditions = Vec::with_capacity(tokens.len());

    for token in tokens {
        let parameter = config.resolve(&token.raw_parameter);

        if let Parameter::Canonical(name) = &parameter {
            if name == main {
                if main_seen {
                    current += 1;
                }
                main_seen = true;
            } else if last_group.get(name.as_str()) == Some(&current) {
                current += 1;
                trace!(parameter = %name, group = current, "repeated parameter overflows into next group");
            }
            last_group.insert(name.clone(), current);
        }

        conditions.push(Condition {
            group: current,
            parameter,
            raw_parameter: token.raw_parameter.clone(),
            operator: token.operator,
            value: Value::coerce(&token.raw_value),
        });
    }

    debug!(conditions = conditions.len(), groups = if conditions.is_empty() { 0 } else { current }, "grouped query");
    conditions
}

/// Distinct group numbers, ascending.
pub fn group_numbers(conditions: &[Condition]) -> Vec<u32> {
    conditions.iter().map(|c| c.group).collect::<BTreeSet<_>>().into_iter().collect()
}
