use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::rescue::{self, RescueCategory};
use crate::view::RecordView;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Breeds")]
    breeds: String,
    #[tabled(rename = "Sex")]
    sex: String,
    #[tabled(rename = "Age (weeks)")]
    age: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

/// Records as a table, one column per field
pub fn records_table(view: &RecordView) -> String {
    if view.columns.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(view.columns.iter().cloned());
    for row in view.rows() {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// The rescue preset table
pub fn categories_table() -> String {
    let rows: Vec<CategoryRow> = RescueCategory::all()
        .iter()
        .map(|category| match rescue::profile(*category) {
            Some(profile) => CategoryRow {
                category: category.to_string(),
                label: category.label().to_string(),
                breeds: profile.breeds.join(", "),
                sex: profile.sex.to_string(),
                age: format!("{} - {}", profile.min_age_weeks, profile.max_age_weeks),
            },
            None => CategoryRow {
                category: category.to_string(),
                label: category.label().to_string(),
                breeds: "any".to_string(),
                sex: "any".to_string(),
                age: "any".to_string(),
            },
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}
