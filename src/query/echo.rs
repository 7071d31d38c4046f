//! Render grouped conditions back to text.

use super::grouper::group_numbers;
use crate::Condition;

/// Join the conditions of `group` with `within`.
pub fn describe_group(conditions: &[Condition], group: u32, within: &str) -> String {
    conditions.iter().filter(|c| c.group == group).map(ToString::to_string).collect::<Vec<_>>().join(within)
}

/// Describe every group, ascending, joining conditions with `within` and
/// groups with `across`.
///
/// ```
/// use decklens::{AliasConfig, parse_query};
/// use decklens::query::describe_groups;
///
/// let conditions = parse_query("card A qty>=2 card B", &AliasConfig::cards());
/// assert_eq!(
///     describe_groups(&conditions, " and ", "; "),
///     "cardname = 'A' and quantity >= 2; cardname = 'B'"
/// );
/// ```
pub fn describe_groups(conditions: &[Condition], within: &str, across: &str) -> String {
    group_numbers(conditions).into_iter().map(|g| describe_group(conditions, g, within)).collect::<Vec<_>>().join(across)
}
