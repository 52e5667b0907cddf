use serde::Serialize;

use crate::store::LineItem;

/// A line item formatted for display: money fields carry exactly
/// two decimal places.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FormattedItem {
    pub description: String,
    pub rate: String,
    pub quantity: String,
    pub unit: String,
    pub total: String,
}

/// A render-ready block: either a named group of items or a single
/// ungrouped item.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineBlock {
    Group {
        name: String,
        items: Vec<FormattedItem>,
    },
    Item(FormattedItem),
}

fn format_item(item: &LineItem) -> FormattedItem {
    FormattedItem {
        description: item.description.clone(),
        rate: format!("{:.2}", item.rate),
        quantity: format!("{:.2}", item.quantity),
        unit: item.unit.clone(),
        total: format!("{:.2}", item.amount()),
    }
}

/// Group line items for rendering. All named groups come first, in the
/// order their names are first encountered; ungrouped items follow in
/// their original relative order. Items within a group keep their
/// original relative order too.
pub fn group_line_items(items: &[LineItem]) -> Vec<LineBlock> {
    let mut groups: Vec<(String, Vec<FormattedItem>)> = Vec::new();
    let mut ungrouped: Vec<FormattedItem> = Vec::new();

    for item in items {
        let formatted = format_item(item);
        match &item.group {
            Some(name) => match groups.iter_mut().find(|(g, _)| g == name) {
                Some((_, members)) => members.push(formatted),
                None => groups.push((name.clone(), vec![formatted])),
            },
            None => ungrouped.push(formatted),
        }
    }

    let mut blocks: Vec<LineBlock> = groups
        .into_iter()
        .map(|(name, items)| LineBlock::Group { name, items })
        .collect();
    blocks.extend(ungrouped.into_iter().map(LineBlock::Item));
    blocks
}

/// Sum of all line totals at full precision
pub fn invoice_total(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::amount).sum()
}

/// Format an amount with two decimals and a space as the thousands
/// separator (e.g. 1234.5 -> "1 234.50")
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", whole),
    };

    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    format!("{sign}{grouped}.{frac}")
}
