use once_cell::sync::Lazy;
use regex::Regex;

use crate::field::field_model::{FieldDescriptor, WidgetType};
use crate::resolve::value::ResolvedValue;

pub const AUTO_EMAIL: &str = "qa@example.com";
pub const AUTO_PHONE: &str = "13800138000";
pub const AUTO_NAME: &str = "测试用户";
pub const AUTO_COMPANY: &str = "测试公司";
pub const AUTO_ADDRESS: &str = "测试路1号";
pub const AUTO_DATE: &str = "2026-02-04";
pub const AUTO_TIME: &str = "10:00";
pub const AUTO_URL: &str = "https://example.com";
pub const AUTO_DEFAULT: &str = "测试";

/// Semantic category a rule recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Email,
    Phone,
    Name,
    Organization,
    Address,
    Date,
    Time,
    Url,
}

struct Rule {
    category: Category,
    pattern: Regex,
    value: &'static str,
}

fn rule(category: Category, pattern: &str, value: &'static str) -> Option<Rule> {
    Regex::new(pattern).ok().map(|pattern| Rule {
        category,
        pattern,
        value,
    })
}

/// Ordered rule table; the first match wins.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    [
        rule(Category::Email, r"(?i)email|邮箱", AUTO_EMAIL),
        rule(Category::Phone, r"(?i)phone|mobile|tel|电话|手机", AUTO_PHONE),
        rule(Category::Name, r"(?i)name|user|account|username|用户名|姓名", AUTO_NAME),
        rule(Category::Organization, r"(?i)company|org|公司|单位|组织", AUTO_COMPANY),
        rule(Category::Address, r"(?i)address|地址", AUTO_ADDRESS),
        rule(Category::Date, r"(?i)date|日期", AUTO_DATE),
        rule(Category::Time, r"(?i)time|时间", AUTO_TIME),
        rule(Category::Url, r"(?i)url|link|链接|网址", AUTO_URL),
    ]
    .into_iter()
    .flatten()
    .collect()
});

fn first_rule(candidates: &[String]) -> Option<&'static Rule> {
    let joined = candidates.join(" ");
    RULES.iter().find(|r| r.pattern.is_match(&joined))
}

/// Category of the first rule matching the space-joined candidate keys.
pub fn categorize(candidates: &[String]) -> Option<Category> {
    first_rule(candidates).map(|r| r.category)
}

/// Deterministic plausible value for a field. Never `Undefined`.
pub fn pick_auto_value(descriptor: &FieldDescriptor) -> ResolvedValue {
    if let Some(hit) = first_rule(descriptor.candidates()) {
        return ResolvedValue::text(hit.value);
    }

    if *descriptor.widget() == WidgetType::Select && !descriptor.options().is_empty() {
        let options = descriptor.options();
        let choice = options
            .iter()
            .find(|o| !o.value.is_empty())
            .unwrap_or(&options[0]);
        let text = if choice.value.is_empty() {
            choice.text.clone()
        } else {
            choice.value.clone()
        };
        return ResolvedValue::text(text);
    }

    ResolvedValue::text(AUTO_DEFAULT)
}
