//! 儀表板 HTML 頁面。所有使用者輸入都經過 `escape`

use crate::domain::model::Channel;
use crate::web::db::{DbUser, Feed, Watch};
use std::fmt::Write;

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="zh">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; }}
pre {{ white-space: pre-wrap; background: #f6f8fa; padding: 1rem; }}
.error {{ color: #c0392b; }}
form.inline {{ display: inline; }}
label {{ display: block; margin: .4rem 0; }}
</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
        body = body
    )
}

fn error_line(error: &str) -> String {
    if error.is_empty() {
        String::new()
    } else {
        format!(r#"<p class="error">{}</p>"#, escape(error))
    }
}

pub fn login_page(error: &str) -> String {
    let body = format!(
        r#"<h1>登录</h1>
{error}
<form method="post" action="/login">
<label>ID <input name="uid" required></label>
<label>密码 <input name="password" type="password" required></label>
<button type="submit">登录</button>
</form>
<p><a href="/register">注册新账号</a></p>"#,
        error = error_line(error)
    );
    layout("登录", &body)
}

pub fn register_page(error: &str) -> String {
    let body = format!(
        r#"<h1>注册</h1>
{error}
<form method="post" action="/register">
<label>ID <input name="uid" required pattern="[a-zA-Z0-9_\-]{{2,32}}"></label>
<label>昵称 <input name="name"></label>
<label>密码 <input name="password" type="password" required></label>
<button type="submit">注册</button>
</form>
<p><a href="/login">已有账号？登录</a></p>"#,
        error = error_line(error)
    );
    layout("注册", &body)
}

fn secret_value(value: &Option<String>) -> String {
    escape(value.as_deref().unwrap_or(""))
}

pub fn dashboard_page(me: &DbUser, watches: &[Watch], feeds: &[Feed]) -> String {
    let mut options = String::new();
    for channel in Channel::ALL {
        let selected = if me.channel == channel.as_str() { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{0}"{1}>{0}</option>"#,
            channel.as_str(),
            selected
        );
    }

    let mut watch_rows = String::new();
    for w in watches {
        let _ = write!(
            watch_rows,
            r#"<li>{code} <form class="inline" method="post" action="/watch/del/{id}"><button>删除</button></form></li>"#,
            code = escape(&w.code),
            id = w.id
        );
    }

    let mut feed_rows = String::new();
    for f in feeds {
        let _ = write!(
            feed_rows,
            r#"<li>{url} <form class="inline" method="post" action="/rss/del/{id}"><button>删除</button></form></li>"#,
            url = escape(&f.url),
            id = f.id
        );
    }

    let body = format!(
        r#"<h1>{name}（{uid}）</h1>
<p><a href="/preview">预览早报</a> · <a href="/logout">退出</a></p>
<h2>推送设置</h2>
<form method="post" action="/profile">
<label>时区 <input name="timezone" value="{timezone}"></label>
<label>渠道 <select name="channel">{options}</select></label>
<label>SCT SendKey <input name="sct_sendkey" value="{sct}"></label>
<label>Telegram Bot Token <input name="tg_bot_token" value="{tg_token}"></label>
<label>Telegram Chat ID <input name="tg_chat_id" value="{tg_chat}"></label>
<label>企业微信 Webhook <input name="wecom_webhook" value="{wecom}"></label>
<button type="submit">保存</button>
</form>
<h2>自选股</h2>
<ul>{watch_rows}</ul>
<form method="post" action="/watch/add">
<input name="code" placeholder="600519 / sz000858" required>
<button type="submit">添加</button>
</form>
<h2>RSS 订阅</h2>
<ul>{feed_rows}</ul>
<form method="post" action="/rss/add">
<input name="url" placeholder="https://..." required>
<button type="submit">添加</button>
</form>"#,
        name = escape(&me.name),
        uid = escape(&me.uid),
        timezone = escape(&me.timezone),
        options = options,
        sct = secret_value(&me.sct_sendkey),
        tg_token = secret_value(&me.tg_bot_token),
        tg_chat = secret_value(&me.tg_chat_id),
        wecom = secret_value(&me.wecom_webhook),
        watch_rows = watch_rows,
        feed_rows = feed_rows,
    );
    layout("仪表盘", &body)
}

pub fn preview_page(markdown: &str) -> String {
    let body = format!(
        r#"<p><a href="/dashboard">返回</a></p>
<pre>{}</pre>"#,
        escape(markdown)
    );
    layout("早报预览", &body)
}

pub fn error_page(status: u16, message: &str) -> String {
    let body = format!(
        r#"<h1>{}</h1>
<p class="error">{}</p>
<p><a href="/dashboard">返回</a></p>"#,
        status,
        escape(message)
    );
    layout("出错了", &body)
}
