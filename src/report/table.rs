//! Two-column plain text tables

#[derive(Debug, Clone, PartialEq)]
enum Row {
    Pair(String, String),
    Rule(usize),
}

/// A header row, a rule under it, then label/value rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new(header: impl Into<String>, value: impl ToString) -> Self {
        let header = header.into();
        let rule = header.chars().count();
        Self {
            rows: vec![Row::Pair(header, value.to_string()), Row::Rule(rule)],
        }
    }

    pub fn row(mut self, label: impl Into<String>, value: impl ToString) -> Self {
        self.rows.push(Row::Pair(label.into(), value.to_string()));
        self
    }

    /// Row whose value is shown with one decimal place
    pub fn decimal_row(self, label: impl Into<String>, value: f64) -> Self {
        self.row(label, format!("{value:.1}"))
    }

    /// Labels left-aligned, values right-aligned, two spaces between
    pub fn render(&self) -> String {
        let label_width = self
            .rows
            .iter()
            .map(|row| match row {
                Row::Pair(label, _) => label.chars().count(),
                Row::Rule(width) => *width,
            })
            .max()
            .unwrap_or(0);
        let value_width = self
            .rows
            .iter()
            .filter_map(|row| match row {
                Row::Pair(_, value) => Some(value.chars().count()),
                Row::Rule(_) => None,
            })
            .max()
            .unwrap_or(0);

        self.rows
            .iter()
            .map(|row| match row {
                Row::Pair(label, value) => {
                    format!("{label:<label_width$}  {value:>value_width$}")
                        .trim_end()
                        .to_string()
                }
                Row::Rule(width) => "-".repeat(*width),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_columns() {
        let table = Table::new("rhel9 hosts:", 2)
            .decimal_row("Longest transfer in minutes:", 12.345)
            .decimal_row("Average runtime in minutes:", 7.0);

        let expected = "\
rhel9 hosts:                     2
------------
Longest transfer in minutes:  12.3
Average runtime in minutes:    7.0";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_decimal_row_rounds_to_one_place() {
        let rendered = Table::new("h", 1).decimal_row("x", 2.96).render();
        assert!(rendered.ends_with("3.0"));
    }

    #[test]
    fn test_rule_matches_header_width() {
        let rendered = Table::new("The number of failed migrations:", 0).render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[1], "-".repeat("The number of failed migrations:".len()));
    }
}
