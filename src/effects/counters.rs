use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use web_sys::Element;

use crate::dom;
use crate::motion;
use crate::page::Page;

const COUNTER_THRESHOLD: f64 = 0.4;
const MAX_DECIMALS: u32 = 6;

static COUNTER_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(\D*?)(\d(?:[\d.,]*\d)?)(.*)$").expect("counter pattern")
});

/// A hero statistic such as `+1,200 clientes`, kept as an integer number of
/// `10^-decimals` units so interpolation stays exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCounter {
    pub prefix: String,
    pub units: u64,
    pub decimals: u32,
    pub suffix: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub thousands: String,
    pub decimal: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            thousands: ",".to_string(),
            decimal: ".".to_string(),
        }
    }
}

impl StatCounter {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = COUNTER_TEXT.captures(text)?;
        let (units, decimals) = parse_number(&caps[2])?;
        Some(Self {
            prefix: caps[1].to_string(),
            units,
            decimals,
            suffix: caps[3].to_string(),
        })
    }

    pub fn render(&self, units: u64, format: &NumberFormat) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            format_units(units.min(self.units), self.decimals, format),
            self.suffix
        )
    }

    pub fn initial_text(&self) -> String {
        format!("{}0{}", self.prefix, self.suffix)
    }

    pub fn text_at(&self, p: f64, format: &NumberFormat) -> String {
        self.render(motion::interpolate_units(p, self.units), format)
    }
}

/// Splits a numeric run like `1,234.5` into scaled units and fraction digits.
/// The separators are thousands groups only when the runs look like grouped
/// digits: one separator character, a leading run of one to three digits not
/// starting with `0`, and three digits in every later run. Otherwise the last
/// separator is the decimal point.
fn parse_number(raw: &str) -> Option<(u64, u32)> {
    let separators: Vec<char> = raw.chars().filter(|c| matches!(c, '.' | ',')).collect();
    let runs: Vec<&str> = raw.split(['.', ',']).collect();
    if runs.iter().any(|run| run.is_empty()) {
        return None;
    }

    let decimals = match runs.last() {
        Some(tail) if !separators.is_empty() && !is_grouped(&separators, &runs) => {
            tail.len() as u32
        }
        _ => 0,
    };
    if decimals > MAX_DECIMALS {
        return None;
    }
    let digits: String = runs.concat();
    let units = digits.parse::<u64>().ok()?;
    Some((units, decimals))
}

fn is_grouped(separators: &[char], runs: &[&str]) -> bool {
    let single_separator = separators.windows(2).all(|pair| pair[0] == pair[1]);
    let lead_ok = runs
        .first()
        .is_some_and(|lead| (1..=3).contains(&lead.len()) && !lead.starts_with('0'));
    single_separator && lead_ok && runs[1..].iter().all(|run| run.len() == 3)
}

pub fn group_thousands(value: u64, separator: &str) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

pub fn format_units(units: u64, decimals: u32, format: &NumberFormat) -> String {
    if decimals == 0 {
        return group_thousands(units, &format.thousands);
    }
    let scale = 10u64.pow(decimals);
    format!(
        "{}{}{:0width$}",
        group_thousands(units / scale, &format.thousands),
        format.decimal,
        units % scale,
        width = decimals as usize
    )
}

pub fn install(page: &Rc<Page>) {
    let format = NumberFormat {
        thousands: page.config.thousands_separator.clone(),
        decimal: page.config.decimal_separator.clone(),
    };
    let mut counters: Vec<(Element, Option<(Element, StatCounter)>)> = Vec::new();
    for item in page.query_all(".hero-stats li") {
        let Some(strong) = item.query_selector(":scope > strong").ok().flatten() else {
            continue;
        };
        let text = strong.text_content().unwrap_or_default();
        let Some(counter) = StatCounter::parse(text.trim()) else {
            log::debug!("counter text {:?} has no number, left as is", text);
            continue;
        };
        strong.set_text_content(Some(counter.initial_text().as_str()));
        counters.push((item, Some((strong, counter))));
    }
    if counters.is_empty() {
        return;
    }

    let targets: Vec<Element> = counters.iter().map(|(item, _)| item.clone()).collect();
    let window = page.window.clone();
    let duration = f64::from(page.config.counter_duration_ms);
    let reduced_motion = page.reduced_motion;

    let result = dom::observe_once(&targets, COUNTER_THRESHOLD, None, move |entered| {
        let Some((_, slot)) = counters.iter_mut().find(|(item, _)| item == entered) else {
            return;
        };
        let Some((strong, counter)) = slot.take() else {
            return;
        };
        if reduced_motion {
            strong.set_text_content(Some(counter.text_at(1.0, &format).as_str()));
            return;
        }
        let format = format.clone();
        motion::run_frames(&window, duration, move |p| {
            strong.set_text_content(Some(counter.text_at(p, &format).as_str()));
        });
    });
    match result {
        Ok(()) => log::info!("counters installed on {} stats", targets.len()),
        Err(e) => log::warn!("counter observer unavailable: {:?}", e),
    }
}
