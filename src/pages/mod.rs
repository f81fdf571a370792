//! Server-rendered HTML pages.
//!
//! Templates are plain HTML with `{{placeholder}}` slots. Every value coming
//! from the store or the request is escaped with `ammonia::clean_text` before
//! substitution; prebuilt fragments (`rows`, `content`, ...) are escaped while
//! they are assembled.
use ammonia::clean_text;

use crate::{
    config::Config,
    models::ambassadormodel::Ambassador,
    service::leaderboard::{
        LeaderboardResult, LeaderboardStats, LeaderboardView, SortDirection, SortKey,
    },
};

const LEADERBOARD_TEMPLATE: &str = include_str!("templates/leaderboard.html");
const REF_CODE_TEMPLATE: &str = include_str!("templates/ref_code.html");
const REFERRAL_RESULT_TEMPLATE: &str = include_str!("templates/referral_result.html");

/// Single pass over the template, so substituted text is never rescanned.
pub fn render_template(template: &str, placeholders: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        match after.find("}}") {
            Some(close) => {
                let key = &after[..close];
                match placeholders.iter().find(|(k, _)| *k == key) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[close + 2..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn discord_join_url(config: &Config, referral_code: &str) -> String {
    format!(
        "https://discord.com/oauth2/authorize?client_id={}&redirect_uri={}&response_type=code&scope=identify%20guilds.join&state=ambassador-referral:{}",
        urlencoding::encode(&config.discord_client_id),
        urlencoding::encode(&config.discord_redirect_uri),
        urlencoding::encode(referral_code)
    )
}

fn view_link(path: &str, view: &LeaderboardView) -> String {
    clean_text(&format!("{}?{}", path, view.to_query()))
}

fn sort_icon(view: &LeaderboardView, key: SortKey) -> &'static str {
    if view.sort.key != key {
        return "";
    }
    match view.sort.direction {
        SortDirection::Asc => " ▲",
        SortDirection::Desc => " ▼",
    }
}

fn sort_link(view: &LeaderboardView, key: SortKey) -> String {
    let mut next = view.clone();
    next.toggle_sort(key);
    view_link("/", &next)
}

fn page_link(view: &LeaderboardView, page: usize) -> String {
    let mut next = view.clone();
    next.page = page;
    view_link("/", &next)
}

fn render_rows(view: &LeaderboardView, result: &LeaderboardResult) -> String {
    if result.page.rows.is_empty() {
        return r#"<tr><td colspan="6" class="empty">No ambassadors match these filters.</td></tr>"#
            .to_string();
    }

    let mut html = String::new();
    for row in &result.page.rows {
        let amb = &row.ambassador;
        let mut toggled = view.clone();
        toggled.page = result.page.page;
        toggled.toggle_expanded(&amb.id);

        html.push_str(&format!(
            r#"<tr class="{}"><td class="rank">{}</td><td><a href="{}">{}</a></td><td>{}</td><td>{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            if row.is_top_three() { "top-three" } else { "" },
            row.rank,
            view_link("/", &toggled),
            clean_text(&amb.name),
            clean_text(&amb.handle),
            clean_text(&amb.country),
            amb.invites,
            format_number(amb.score as i64),
        ));

        if view.is_expanded(&amb.id) {
            let multiplier = amb
                .bonus_multiplier
                .map(|m| format!("{}x", m))
                .unwrap_or_else(|| "-".to_string());
            html.push_str(&format!(
                r#"<tr class="details"><td colspan="6">Country: {} · Invites: {} · Multiplier: {} · Wallet: {}</td></tr>"#,
                clean_text(&amb.country),
                amb.invites,
                clean_text(&multiplier),
                clean_text(amb.wallet.as_deref().unwrap_or("-")),
            ));
        }
    }
    html
}

fn render_pagination(view: &LeaderboardView, result: &LeaderboardResult) -> String {
    let page = &result.page;
    let mut html = String::new();

    if page.has_previous() {
        html.push_str(&format!(r#"<a href="{}">Previous</a> "#, page_link(view, page.page - 1)));
    }

    let (numbers, more) = page.page_numbers();
    for number in numbers {
        html.push_str(&format!(
            r#"<a class="{}" href="{}">{}</a> "#,
            if number == page.page { "current" } else { "" },
            page_link(view, number),
            number
        ));
    }
    if more {
        html.push_str("<span>...</span> ");
    }

    if page.has_next() {
        html.push_str(&format!(r#"<a href="{}">Next</a>"#, page_link(view, page.page + 1)));
    }
    html
}

pub fn leaderboard_page(
    view: &LeaderboardView,
    result: &LeaderboardResult,
    stats: &LeaderboardStats,
    countries: &[String],
) -> String {
    let selected = view.filter.country.as_deref().map(str::to_lowercase);
    let country_options = countries
        .iter()
        .map(|country| {
            let is_selected = selected.as_deref() == Some(country.to_lowercase().as_str());
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                clean_text(country),
                if is_selected { " selected" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("");

    let mut current = view.clone();
    current.page = result.page.page;
    let export_all = clean_text(&format!("/api/leaderboard/export?{}&scope=all", current.to_query()));
    let export_page = clean_text(&format!("/api/leaderboard/export?{}&scope=page", current.to_query()));

    render_template(
        LEADERBOARD_TEMPLATE,
        &[
            ("total_ambassadors", format_number(stats.total_ambassadors as i64)),
            ("total_invites", format_number(stats.total_invites)),
            ("average_score", format_number(stats.average_score)),
            ("search", clean_text(&view.filter.search)),
            ("country_options", country_options),
            ("min_score", view.filter.min_score.map(|v| v.to_string()).unwrap_or_default()),
            ("max_score", view.filter.max_score.map(|v| v.to_string()).unwrap_or_default()),
            ("sort", view.sort.key.to_string()),
            ("direction", view.sort.direction.to_str().to_string()),
            ("sort_rank", sort_link(view, SortKey::Rank)),
            ("sort_rank_icon", sort_icon(view, SortKey::Rank).to_string()),
            ("sort_name", sort_link(view, SortKey::Name)),
            ("sort_name_icon", sort_icon(view, SortKey::Name).to_string()),
            ("sort_invites", sort_link(view, SortKey::Invites)),
            ("sort_invites_icon", sort_icon(view, SortKey::Invites).to_string()),
            ("sort_score", sort_link(view, SortKey::Score)),
            ("sort_score_icon", sort_icon(view, SortKey::Score).to_string()),
            ("rows", render_rows(view, result)),
            ("summary", result.page.summary()),
            ("pagination", render_pagination(view, result)),
            ("export_all", export_all),
            ("export_page", export_page),
        ],
    )
}

pub fn ref_code_page(ambassador: Option<&Ambassador>, config: &Config) -> String {
    let content = match ambassador {
        Some(amb) => format!(
            r#"<div class="label">Ambassador Name</div><div class="name">{}</div>
    <div class="label">Handle</div><div>{}</div>
    <div class="label">Country</div><div>{}</div>
    <div class="label">Referral Code</div><div class="code">{}</div>
    <a class="join discord" href="{}" target="_blank" rel="noopener noreferrer">Join Discord Community</a>
    <a class="join telegram" href="{}" target="_blank" rel="noopener noreferrer">Join Telegram Channel</a>"#,
            clean_text(&amb.name),
            clean_text(&amb.handle),
            clean_text(&amb.country),
            clean_text(&amb.referral_code),
            clean_text(&discord_join_url(config, &amb.referral_code)),
            clean_text(&config.telegram_url),
        ),
        None => r#"<div class="invalid">Referral code not found or invalid.</div>"#.to_string(),
    };

    render_template(REF_CODE_TEMPLATE, &[("content", content)])
}

pub fn referral_result_page(success: bool, reason: Option<&str>, ref_code: Option<&str>) -> String {
    let content = if success {
        format!(
            r#"<h1 class="success">Referral Linked Successfully 🎉</h1>
  <p>You've successfully joined under referral <span class="highlight">{}</span>.</p>
  <p>Welcome to the Community.</p>"#,
            clean_text(ref_code.unwrap_or_default())
        )
    } else {
        let reason = reason.filter(|r| !r.is_empty()).unwrap_or("unknown");
        format!(
            r#"<h1 class="failure">Referral Failed ❌</h1>
  <p>We couldn't complete your referral.</p>
  <p>Reason: <span class="reason">{}</span></p>"#,
            clean_text(reason)
        )
    };

    render_template(REFERRAL_RESULT_TEMPLATE, &[("content", content)])
}
