//! Fixture templating.
//!
//! Fixture values are templates in the Mock.js dialect: property names may
//! carry a generation rule after `|`, and strings may contain `@placeholder`
//! calls. [`MockTemplate`] implements the commonly used subset.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use regex::{Captures, Regex};
use serde_json::{Map, Number, Value};

/// Renders a fixture template into a concrete response body.
pub trait MockRenderer: Send + Sync {
    fn render(&self, template: &Value) -> Value;
}

/// Mock.js-compatible renderer backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockTemplate;

impl MockRenderer for MockTemplate {
    fn render(&self, template: &Value) -> Value {
        self.render_with(template, &mut rand::thread_rng())
    }
}

impl MockTemplate {
    /// Render with an explicit random source.
    pub fn render_with<R: Rng + ?Sized>(&self, template: &Value, rng: &mut R) -> Value {
        generate(template, None, 0, rng)
    }
}

static RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+(\d+)|(-?\d+)(?:-(-?\d+))?(?:\.(\d+)(?:-(\d+))?)?)$")
        .expect("rule pattern is valid")
});

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\?@([A-Za-z_]\w*)(?:\(([^)]*)\))?").expect("placeholder pattern is valid")
});

/// Generation rule parsed from `name|rule`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Rule {
    min: Option<i64>,
    max: Option<i64>,
    dmin: Option<u32>,
    dmax: Option<u32>,
    step: Option<i64>,
}

impl Rule {
    fn parse(source: &str) -> Option<Self> {
        let caps = RULE.captures(source)?;
        let int = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i64>().ok());
        let dec = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

        Some(Self {
            step: int(1),
            min: int(2),
            max: int(3),
            dmin: dec(4),
            dmax: dec(5),
        })
    }

    fn has_range(&self) -> bool {
        self.min.is_some()
    }

    /// `|1` alone: pick one element or flip a coin.
    fn is_single(&self) -> bool {
        self.min == Some(1) && self.max.is_none() && self.dmin.is_none()
    }

    fn count<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<i64> {
        let min = self.min?;
        let max = self.max.unwrap_or(min);
        Some(rng.gen_range(min.min(max)..=min.max(max)))
    }

    /// Repeat count for strings, arrays and objects, capped at [`MAX_REPEAT`].
    fn repeat<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.count(rng)
            .map(|count| usize::try_from(count.max(0)).unwrap_or(MAX_REPEAT).min(MAX_REPEAT))
    }

    fn decimals<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        let dmin = self.dmin?;
        let dmax = self.dmax.unwrap_or(dmin);
        Some(rng.gen_range(dmin.min(dmax)..=dmin.max(dmax)))
    }
}

fn split_key(key: &str) -> (&str, Option<Rule>) {
    match key.split_once('|') {
        Some((name, rule)) => (name, Rule::parse(rule)),
        None => (key, None),
    }
}

/// `index` is the position within the nearest repeated array, used by `+step`.
fn generate<R: Rng + ?Sized>(template: &Value, rule: Option<Rule>, index: i64, rng: &mut R) -> Value {
    match template {
        Value::Bool(value) => generate_bool(*value, rule, rng),
        Value::Number(number) => generate_number(number, rule, index, rng),
        Value::String(text) => generate_string(text, rule, rng),
        Value::Array(items) => generate_array(items, rule, index, rng),
        Value::Object(props) => generate_object(props, rule, index, rng),
        Value::Null => Value::Null,
    }
}

fn generate_bool<R: Rng + ?Sized>(value: bool, rule: Option<Rule>, rng: &mut R) -> Value {
    let Some(rule) = rule.filter(Rule::has_range) else {
        return Value::Bool(value);
    };
    let min = rule.min.unwrap_or(1).max(0) as f64;
    let max = rule.max.unwrap_or(1).max(0) as f64;
    let keep = if min + max == 0.0 { 0.5 } else { min / (min + max) };
    Value::Bool(if rng.gen_bool(keep.clamp(0.0, 1.0)) { value } else { !value })
}

fn generate_number<R: Rng + ?Sized>(
    template: &Number,
    rule: Option<Rule>,
    index: i64,
    rng: &mut R,
) -> Value {
    let Some(rule) = rule else {
        return Value::Number(template.clone());
    };

    if let Some(step) = rule.step {
        return match template.as_i64() {
            Some(start) => Value::from(start.saturating_add(step.saturating_mul(index))),
            None => Value::from(template.as_f64().unwrap_or(0.0) + step.saturating_mul(index) as f64),
        };
    }

    let integer = rule
        .count(rng)
        .unwrap_or_else(|| template.as_f64().map(|f| f.trunc() as i64).unwrap_or(0));

    match rule.decimals(rng) {
        Some(places) => float_value(integer, places, rng),
        None => Value::from(integer),
    }
}

/// Integer part plus `places` random digits, the last one non-zero.
fn float_value<R: Rng + ?Sized>(integer: i64, places: u32, rng: &mut R) -> Value {
    if places == 0 {
        return Value::from(integer);
    }
    let places = places.min(15);
    let mut digits = String::with_capacity(places as usize);
    for i in 0..places {
        let low = if i + 1 == places { 1 } else { 0 };
        digits.push(char::from(b'0' + rng.gen_range(low..=9u8)));
    }
    format!("{integer}.{digits}")
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(integer))
}

fn generate_string<R: Rng + ?Sized>(template: &str, rule: Option<Rule>, rng: &mut R) -> Value {
    let repeated = match rule.and_then(|r| r.repeat(rng)) {
        Some(count) => template.repeat(count),
        None => template.to_string(),
    };
    expand_placeholders(&repeated, rng)
}

fn generate_array<R: Rng + ?Sized>(
    items: &[Value],
    rule: Option<Rule>,
    index: i64,
    rng: &mut R,
) -> Value {
    let Some(rule) = rule else {
        return Value::Array(items.iter().map(|item| generate(item, None, index, rng)).collect());
    };
    if items.is_empty() {
        return Value::Array(Vec::new());
    }

    if rule.is_single() {
        let picked = items.choose(rng).unwrap_or(&Value::Null);
        return generate(picked, None, index, rng);
    }

    if let Some(step) = rule.step {
        let position = step.saturating_mul(index).rem_euclid(items.len() as i64) as usize;
        return generate(&items[position], None, index, rng);
    }

    let count = rule.repeat(rng).unwrap_or(1);
    let mut out = Vec::new();
    let reserved = items
        .len()
        .checked_mul(count)
        .is_some_and(|total| out.try_reserve(total).is_ok());
    if !reserved {
        tracing::warn!("Cannot repeat {} item(s) {count} times", items.len());
        return Value::Array(out);
    }
    for i in 0..count {
        for item in items {
            out.push(generate(item, None, i as i64, rng));
        }
    }
    Value::Array(out)
}

fn generate_object<R: Rng + ?Sized>(
    props: &Map<String, Value>,
    rule: Option<Rule>,
    index: i64,
    rng: &mut R,
) -> Value {
    let mut keys: Vec<&String> = props.keys().collect();
    if let Some(count) = rule.and_then(|r| r.repeat(rng)) {
        keys.shuffle(rng);
        keys.truncate(count);
    }

    let mut out = Map::with_capacity(keys.len());
    for key in keys {
        let (name, rule) = split_key(key);
        out.insert(name.to_string(), generate(&props[key], rule, index, rng));
    }
    Value::Object(out)
}

/// Replace every `@placeholder`. A string that is exactly one placeholder
/// keeps the placeholder's type.
fn expand_placeholders<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Value {
    if !text.starts_with('\\') {
        let whole = PLACEHOLDER
            .captures(text)
            .filter(|caps| caps.get(0).is_some_and(|m| m.as_str().len() == text.len()));
        if let Some(value) = whole.and_then(|caps| placeholder(&caps, rng)) {
            return value;
        }
    }

    let expanded = PLACEHOLDER.replace_all(text, |caps: &Captures<'_>| {
        let whole = &caps[0];
        if let Some(escaped) = whole.strip_prefix('\\') {
            return escaped.to_string();
        }
        match placeholder(caps, rng) {
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => whole.to_string(),
        }
    });
    Value::String(expanded.into_owned())
}

fn placeholder<R: Rng + ?Sized>(caps: &Captures<'_>, rng: &mut R) -> Option<Value> {
    let name = caps.get(1)?.as_str().to_ascii_lowercase();
    let args = caps.get(2).map(|m| parse_args(m.as_str())).unwrap_or_default();
    let int_arg = |i: usize| args.get(i).and_then(|a| a.as_i64());

    let value = match name.as_str() {
        "id" => Value::String(digits(18, rng)),
        "guid" | "uuid" => Value::String(uuid::Uuid::new_v4().to_string()),
        "integer" | "int" => {
            let min = int_arg(0).unwrap_or(-MAX_SAFE);
            let max = int_arg(1).unwrap_or(MAX_SAFE);
            Value::from(range(min, max, rng))
        }
        "natural" => {
            let min = int_arg(0).unwrap_or(0).max(0);
            let max = int_arg(1).unwrap_or(MAX_SAFE);
            Value::from(range(min, max, rng))
        }
        "float" => {
            let integer = range(int_arg(0).unwrap_or(-MAX_SAFE), int_arg(1).unwrap_or(MAX_SAFE), rng);
            let dmin = int_arg(2).unwrap_or(0).clamp(0, 15);
            let dmax = int_arg(3).unwrap_or(15).clamp(0, 15);
            float_value(integer, range(dmin, dmax, rng) as u32, rng)
        }
        "boolean" | "bool" => Value::Bool(rng.gen_bool(0.5)),
        "string" => {
            let len = match (int_arg(0), int_arg(1)) {
                (Some(min), Some(max)) => range(min, max, rng),
                (Some(len), None) => len,
                _ => range(3, 7, rng),
            };
            Value::String(letters(len.max(0) as usize, rng))
        }
        "word" => Value::String(word_with(int_arg(0), int_arg(1), rng)),
        "sentence" => Value::String(sentence(rng)),
        "title" => Value::String(title(rng)),
        "first" => Value::String(pick(FIRST_NAMES, rng).to_string()),
        "last" => Value::String(pick(LAST_NAMES, rng).to_string()),
        "name" => Value::String(format!("{} {}", pick(FIRST_NAMES, rng), pick(LAST_NAMES, rng))),
        "email" => Value::String(format!(
            "{}@{}.{}",
            word_with(Some(1), Some(1), rng),
            word_with(Some(3), Some(8), rng),
            pick(TLDS, rng)
        )),
        "url" => Value::String(format!(
            "{}://{}.{}/{}",
            pick(&["http", "https"], rng),
            word_with(Some(3), Some(8), rng),
            pick(TLDS, rng),
            word_with(Some(3), Some(8), rng)
        )),
        "ip" => Value::String(format!(
            "{}.{}.{}.{}",
            rng.gen_range(1..=255u8),
            rng.gen_range(0..=255u8),
            rng.gen_range(0..=255u8),
            rng.gen_range(0..=255u8)
        )),
        "date" => Value::String(timestamp(args.first(), "yyyy-MM-dd", rng)?),
        "time" => Value::String(timestamp(args.first(), "HH:mm:ss", rng)?),
        "datetime" => Value::String(timestamp(args.first(), "yyyy-MM-dd HH:mm:ss", rng)?),
        "color" => Value::String(format!("#{:06x}", rng.gen_range(0..=0xFF_FFFFu32))),
        "pick" => args.choose(rng).cloned().unwrap_or(Value::Null),
        _ => return None,
    };
    Some(value)
}

const MAX_SAFE: i64 = 9_007_199_254_740_991;

/// Upper bound for any repeat count or generated string length.
const MAX_REPEAT: usize = 1000;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Linda", "Michael", "Barbara", "William",
    "Elizabeth", "David", "Jennifer", "Richard", "Susan", "Joseph", "Margaret", "Thomas",
    "Dorothy", "Charles", "Lisa",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis", "Garcia", "Rodriguez",
    "Wilson", "Martinez", "Anderson", "Taylor", "Thomas", "Hernandez", "Moore", "Martin",
    "Jackson", "Thompson", "White",
];

const TLDS: &[&str] = &["com", "net", "org", "edu", "gov", "io", "dev"];

/// Comma-separated arguments; JSON literals keep their type.
fn parse_args(raw: &str) -> Vec<Value> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',')
        .map(str::trim)
        .map(|arg| {
            let unquoted = arg
                .strip_prefix('"')
                .and_then(|a| a.strip_suffix('"'))
                .or_else(|| arg.strip_prefix('\'').and_then(|a| a.strip_suffix('\'')));
            match unquoted {
                Some(text) => Value::String(text.to_string()),
                None => serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string())),
            }
        })
        .collect()
}

fn range<R: Rng + ?Sized>(a: i64, b: i64, rng: &mut R) -> i64 {
    rng.gen_range(a.min(b)..=a.max(b))
}

fn pick<'a, R: Rng + ?Sized>(options: &[&'a str], rng: &mut R) -> &'a str {
    options.choose(rng).copied().unwrap_or_default()
}

fn digits<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len)
        .map(|i| {
            let low = if i == 0 { 1 } else { 0 };
            char::from(b'0' + rng.gen_range(low..=9u8))
        })
        .collect()
}

fn letters<R: Rng + ?Sized>(len: usize, rng: &mut R) -> String {
    (0..len.min(MAX_REPEAT))
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

fn word_with<R: Rng + ?Sized>(min: Option<i64>, max: Option<i64>, rng: &mut R) -> String {
    let len = match (min, max) {
        (Some(min), Some(max)) => range(min, max, rng),
        (Some(len), None) => len,
        _ => range(3, 10, rng),
    };
    letters(len.max(0) as usize, rng)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let words: Vec<String> = (0..rng.gen_range(12..=18))
        .map(|_| word_with(None, None, rng))
        .collect();
    format!("{}.", capitalize(&words.join(" ")))
}

fn title<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..rng.gen_range(3..=7))
        .map(|_| capitalize(&word_with(None, None, rng)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Random instant between the epoch and now, in a Mock.js date format.
/// `None` when the format has a `%` sequence chrono cannot render.
fn timestamp<R: Rng + ?Sized>(format: Option<&Value>, default: &str, rng: &mut R) -> Option<String> {
    let now = Utc::now();
    let secs = rng.gen_range(0..=now.timestamp().max(0));
    let instant: DateTime<Utc> = DateTime::from_timestamp(secs, 0).unwrap_or(now);
    let format = format.and_then(Value::as_str).unwrap_or(default);
    let mut out = String::new();
    write!(out, "{}", instant.format(&chrono_format(format))).ok()?;
    Some(out)
}

fn chrono_format(format: &str) -> String {
    [
        ("yyyy", "%Y"),
        ("yy", "%y"),
        ("MM", "%m"),
        ("dd", "%d"),
        ("HH", "%H"),
        ("mm", "%M"),
        ("ss", "%S"),
    ]
    .iter()
    .fold(format.to_string(), |acc, (token, spec)| acc.replace(token, spec))
}
