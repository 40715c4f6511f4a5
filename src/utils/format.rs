/// 东方财富个股详情页
const QUOTE_PAGE_URL: &str = "https://quote.eastmoney.com";

/// 6 开头为沪市，其余一律按深市处理
pub fn market_prefix(code: &str) -> &'static str {
    if code.starts_with('6') { "sh" } else { "sz" }
}

pub fn detail_url(code: &str) -> String {
    format!("{}/{}{}.html", QUOTE_PAGE_URL, market_prefix(code), code)
}

/// 提取六位纯数字代码，兼容 "sh600000" / "1.600000" / "600000"
pub fn normalize_code(raw: &str) -> Option<String> {
    let digits: String = raw.trim().chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 6 {
        return None;
    }
    Some(digits[digits.len() - 6..].to_string())
}

/// 总市值（元）转 "N.NN亿"
pub fn format_market_cap_yi(cap: Option<f64>) -> String {
    match cap {
        Some(v) if v.is_finite() => format!("{:.2}亿", v / 1e8),
        _ => "-".to_string(),
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// 东方财富缺失值以 "-" 表示；数字、数字字符串之外的值以及 NaN/inf 一律为 None
pub fn lenient_f64(v: &serde_json::Value) -> Option<f64> {
    let parsed = if let Some(f) = v.as_f64() {
        Some(f)
    } else if let Some(s) = v.as_str() {
        s.trim().parse::<f64>().ok()
    } else {
        None
    };
    parsed.filter(|f| f.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_prefix_rule() {
        assert_eq!(market_prefix("600519"), "sh");
        assert_eq!(market_prefix("688981"), "sh");
        assert_eq!(market_prefix("000001"), "sz");
        assert_eq!(market_prefix("300750"), "sz");
        assert_eq!(market_prefix("830799"), "sz");
    }

    #[test]
    fn test_detail_url() {
        assert_eq!(detail_url("600519"), "https://quote.eastmoney.com/sh600519.html");
        assert_eq!(detail_url("002415"), "https://quote.eastmoney.com/sz002415.html");
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("sh600000").as_deref(), Some("600000"));
        assert_eq!(normalize_code("1.600000").as_deref(), Some("600000"));
        assert_eq!(normalize_code(" 000001 ").as_deref(), Some("000001"));
        assert_eq!(normalize_code("BK0477"), None);
        assert_eq!(normalize_code(""), None);
    }

    #[test]
    fn test_format_market_cap() {
        assert_eq!(format_market_cap_yi(Some(6e9)), "60.00亿");
        assert_eq!(format_market_cap_yi(Some(123_456_789_012.0)), "1234.57亿");
        assert_eq!(format_market_cap_yi(None), "-");
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(9.96, 1), 10.0);
        assert_eq!(round_to(1.234, 2), 1.23);
    }

    #[test]
    fn test_lenient_f64() {
        use serde_json::json;
        assert_eq!(lenient_f64(&json!(5.1)), Some(5.1));
        assert_eq!(lenient_f64(&json!(" 12.5 ")), Some(12.5));
        assert_eq!(lenient_f64(&json!("-")), None);
        assert_eq!(lenient_f64(&json!("NaN")), None);
        assert_eq!(lenient_f64(&json!("inf")), None);
        assert_eq!(lenient_f64(&json!(null)), None);
        assert_eq!(lenient_f64(&json!(true)), None);
    }
}
