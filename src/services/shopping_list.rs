use crate::db::ShoppingListRow;

/// Render the aggregated cart rows as the plain-text attachment body:
/// a header line, then `{name} - {unit} - {total}` per ingredient.
#[must_use]
pub fn render(rows: &[ShoppingListRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push("Your shopping list:\n".to_string());

    for row in rows {
        lines.push(format!(
            "{} - {} - {}",
            row.name, row.measurement_unit, row.total
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, unit: &str, total: i64) -> ShoppingListRow {
        ShoppingListRow {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total,
        }
    }

    #[test]
    fn renders_header_and_lines() {
        let rows = vec![row("flour", "g", 500), row("sugar", "g", 300)];
        let text = render(&rows);

        assert!(text.starts_with("Your shopping list:\n"));
        assert!(text.contains("flour - g - 500"));
        assert!(text.contains("sugar - g - 300"));
    }

    #[test]
    fn empty_cart_is_just_the_header() {
        assert_eq!(render(&[]), "Your shopping list:\n");
    }
}
