//! 早報 Markdown 渲染

use crate::domain::model::{IndexQuote, NewsItem, NorthFlow, StockQuote};
use std::fmt::Write;

pub const FOOTER: &str = "> 数据来源：交易所/公开RSS/akshare/新浪。仅作信息参考，不构成投资建议。";

fn arrow(change_pct: Option<f64>) -> &'static str {
    match change_pct {
        Some(v) if v >= 0.0 => "🔺",
        _ => "🔻",
    }
}

fn price_str(price: Option<f64>) -> String {
    price
        .filter(|p| p.is_finite())
        .map(|p| format!("{:.2}", p))
        .unwrap_or_else(|| "-".to_string())
}

fn pct_str(change_pct: Option<f64>) -> String {
    change_pct
        .filter(|p| p.is_finite())
        .map(|p| format!("{:.2}%", p))
        .unwrap_or_else(|| "-".to_string())
}

pub fn render_markdown(
    gen_time: &str,
    indices: &[IndexQuote],
    north: &NorthFlow,
    watchlist: &[StockQuote],
    news: &[NewsItem],
    username: &str,
) -> String {
    let mut s = String::new();
    let pre = if username.is_empty() {
        String::new()
    } else {
        format!("{}的", username)
    };
    // 寫入 String 不會失敗
    let _ = writeln!(s, "# 📈 {}每日财经早报（{}）\n", pre, gen_time);

    s.push_str("## 大盘速览\n");
    for x in indices {
        let _ = writeln!(
            s,
            "- {}：{}（{} {}）",
            x.name,
            price_str(x.price),
            arrow(x.change_pct),
            pct_str(x.change_pct)
        );
    }
    s.push('\n');

    s.push_str("## 北向资金\n");
    match north.net_in.filter(|v| v.is_finite()) {
        Some(v) => {
            let sign = if v >= 0.0 { "🔺净流入" } else { "🔻净流出" };
            let _ = writeln!(s, "- {}: {} **{:.2} 亿元**\n", north.date, sign, v);
        }
        None => s.push_str("- 数据暂不可用\n\n"),
    }

    if !watchlist.is_empty() {
        s.push_str("## 自选股动向\n");
        for r in watchlist {
            let _ = writeln!(
                s,
                "- {}({})：{}（{} {}）",
                r.name,
                r.code,
                price_str(r.price),
                arrow(r.change_pct),
                pct_str(r.change_pct)
            );
        }
        s.push('\n');
    }

    if !news.is_empty() {
        s.push_str("## 新闻速读（精选）\n");
        for it in news {
            let title = it.title.replace('\n', " ");
            let _ = writeln!(s, "- [{}]({})", title.trim(), it.link);
        }
        s.push('\n');
    }

    s.push_str(FOOTER);
    s.push('\n');
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices() -> Vec<IndexQuote> {
        vec![
            IndexQuote {
                name: "上证指数".to_string(),
                price: Some(3210.554),
                change_pct: Some(0.38),
            },
            IndexQuote {
                name: "深证成指".to_string(),
                price: Some(10123.4),
                change_pct: Some(-0.49),
            },
            IndexQuote::unavailable("创业板指"),
        ]
    }

    #[test]
    fn test_render_minimal_report() {
        let md = render_markdown("2025-01-02 08:30", &indices(), &NorthFlow::default(), &[], &[], "");

        let expected = "# 📈 每日财经早报（2025-01-02 08:30）\n\n\
## 大盘速览\n\
- 上证指数：3210.55（🔺 0.38%）\n\
- 深证成指：10123.40（🔻 -0.49%）\n\
- 创业板指：-（🔻 -）\n\
\n\
## 北向资金\n\
- 数据暂不可用\n\
\n\
> 数据来源：交易所/公开RSS/akshare/新浪。仅作信息参考，不构成投资建议。\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_render_full_report() {
        let north = NorthFlow {
            date: "2025-01-02".to_string(),
            net_in: Some(-12.3456),
        };
        let watchlist = vec![StockQuote {
            code: "sh600519".to_string(),
            name: "贵州茅台".to_string(),
            price: Some(1530.0),
            change_pct: Some(0.0),
        }];
        let news = vec![NewsItem {
            source: "https://feed.example.com".to_string(),
            title: "  央行\n降准 ".to_string(),
            link: "https://news.example.com/1".to_string(),
            time: String::new(),
        }];

        let md = render_markdown("2025-01-02 08:30", &indices(), &north, &watchlist, &news, "Eva");

        assert!(md.starts_with("# 📈 Eva的每日财经早报（2025-01-02 08:30）\n\n"));
        assert!(md.contains("## 北向资金\n- 2025-01-02: 🔻净流出 **-12.35 亿元**\n\n"));
        assert!(md.contains("## 自选股动向\n- 贵州茅台(sh600519)：1530.00（🔺 0.00%）\n\n"));
        assert!(md.contains("## 新闻速读（精选）\n- [央行 降准](https://news.example.com/1)\n\n"));
        assert!(md.ends_with(&format!("{}\n", FOOTER)));
    }

    #[test]
    fn test_positive_north_flow() {
        let north = NorthFlow {
            date: "2025-01-03".to_string(),
            net_in: Some(0.0),
        };
        let md = render_markdown("t", &[], &north, &[], &[], "");
        assert!(md.contains("- 2025-01-03: 🔺净流入 **0.00 亿元**"));
        assert!(!md.contains("自选股动向"));
        assert!(!md.contains("新闻速读"));
    }
}
