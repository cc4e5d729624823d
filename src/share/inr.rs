//! Rupee amounts with Indian digit grouping (`12,34,567`).

/// Groups the integer digits of `digits` as lakh/crore: last three, then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// Number with Indian grouping and at most two decimals, trailing zeros dropped.
pub fn group_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc();
    let cents = ((rounded - whole) * 100.0).round() as u64;

    let mut out = String::new();
    if negative && rounded > 0.0 {
        out.push('-');
    }
    out.push_str(&group_indian(&format!("{whole:.0}")));
    if cents > 0 {
        if cents % 10 == 0 {
            out.push_str(&format!(".{}", cents / 10));
        } else {
            out.push_str(&format!(".{cents:02}"));
        }
    }
    out
}

pub fn format_inr(amount: f64) -> String {
    format!("₹{}", group_amount(amount))
}
