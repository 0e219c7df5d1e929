use chrono::NaiveDateTime;

pub const DEFAULT_TEMPLATE: &str = "Flt{GroupNum}_{StartTime}_{EndTime}";

pub const GROUP_NUM: &str = "{GroupNum}";
/// Older spelling of `{GroupNum}`, still accepted.
pub const FLIGHT_NUM: &str = "{FltNum}";
pub const START_TIME: &str = "{StartTime}";
pub const END_TIME: &str = "{EndTime}";
pub const DATE: &str = "{Date}";

/// Placeholders shown to the operator when editing the template.
pub const PLACEHOLDERS: [&str; 4] = [GROUP_NUM, START_TIME, END_TIME, DATE];

/// Values substituted into a name template for one temporal group.
#[derive(Debug, Clone, Copy)]
pub struct NameContext {
    pub group_num: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Substitute the known placeholders; anything else is left as written.
pub fn render_name(template: &str, ctx: &NameContext) -> String {
    let group_num = format!("{:02}", ctx.group_num);
    template
        .replace(GROUP_NUM, &group_num)
        .replace(FLIGHT_NUM, &group_num)
        .replace(START_TIME, &ctx.start.format("%H%M").to_string())
        .replace(END_TIME, &ctx.end.format("%H%M").to_string())
        .replace(DATE, &ctx.end.format("%Y%m%d").to_string())
}
