/// Format a number with thousands separators and two decimals: 1,234.56
pub fn number(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if val < 0.0 && cents != "0.00" {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Format a money amount with the given currency symbol: ₹1,234.56, -$500.00
pub fn money(val: f64, currency: &str) -> String {
    let n = number(val);
    match n.strip_prefix('-') {
        Some(rest) => format!("-{currency}{rest}"),
        None => format!("{currency}{n}"),
    }
}

/// Period-over-period change: `+12%`, `-4%`, `0%`.
pub fn change(pct: i64) -> String {
    if pct > 0 {
        format!("+{pct}%")
    } else {
        format!("{pct}%")
    }
}
