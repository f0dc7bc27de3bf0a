//! 动态数据生成器
//!
//! 每种 [`DataKind`] 对应一个生成函数，输入只有该类型的配置，
//! 调用之间不共享可变状态。

use chrono::{SecondsFormat, TimeDelta, Utc};
use rand::Rng;
use rand::distr::{Alphanumeric, SampleString};
use rand::seq::{IndexedRandom, SliceRandom};

use crate::variable::types::DataKind;

const DEFAULT_PASSWORD_LENGTH: usize = 10;
const DEFAULT_SPECIAL_CHARS: &str = "!@#$%^&*";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Charles", "Karen", "Wei", "Aiko", "Mateo", "Amara", "Lucas", "Sofia",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Chen", "Tanaka", "Okafor", "Silva",
];

const CITIES: &[&str] = &[
    "Springfield", "Riverside", "Franklin", "Greenville", "Bristol", "Clinton", "Fairview",
    "Salem", "Madison", "Georgetown", "Arlington", "Ashland", "Dover", "Oxford", "Jackson",
    "Burlington", "Manchester", "Milton",
];

const STATES: &[&str] = &[
    "Alabama", "Alaska", "Arizona", "California", "Colorado", "Florida", "Georgia", "Illinois",
    "Kansas", "Maine", "Michigan", "Nevada", "New York", "Ohio", "Oregon", "Texas", "Utah",
    "Vermont", "Washington", "Wisconsin",
];

const COUNTRIES: &[(&str, &str)] = &[
    ("United States", "US"),
    ("Canada", "CA"),
    ("Mexico", "MX"),
    ("Brazil", "BR"),
    ("United Kingdom", "GB"),
    ("France", "FR"),
    ("Germany", "DE"),
    ("Spain", "ES"),
    ("Italy", "IT"),
    ("Japan", "JP"),
    ("China", "CN"),
    ("India", "IN"),
    ("Australia", "AU"),
    ("Nigeria", "NG"),
    ("South Africa", "ZA"),
    ("Sweden", "SE"),
];

const WORDS: &[&str] = &[
    "alpha", "amet", "aurora", "beacon", "cedar", "dolor", "ember", "falcon", "harbor", "ipsum",
    "lorem", "maple", "nimbus", "orbit", "pixel", "quartz", "river", "sit", "summit", "velvet",
];

const DOMAIN_SUFFIXES: &[&str] = &["com", "net", "org", "io", "dev", "info"];

/// 按类型生成一个新值
pub fn generate(kind: &DataKind) -> String {
    let mut rng = rand::rng();

    match kind {
        DataKind::Text => pick(WORDS).to_string(),
        DataKind::Number => rng.random_range(1..=1000).to_string(),
        DataKind::SingleDigit => rng.random_range(0..=9).to_string(),
        DataKind::Boolean => rng.random_bool(0.5).to_string(),
        DataKind::Object => serde_json::json!({
            "id": uuid::Uuid::new_v4().to_string(),
            "name": full_name(),
            "email": email(&domain_name()),
        })
        .to_string(),
        DataKind::FirstName => pick(FIRST_NAMES).to_string(),
        DataKind::LastName => pick(LAST_NAMES).to_string(),
        DataKind::FullName => full_name(),
        DataKind::Email => email(&domain_name()),
        DataKind::EmailWithDomain { email_domain } => match email_domain.as_deref() {
            Some(domain) if !domain.trim().is_empty() => email(domain.trim()),
            _ => email(&domain_name()),
        },
        DataKind::StaticPassword { static_value } => static_value.clone().unwrap_or_default(),
        DataKind::DynamicPassword {
            password_length,
            special_chars,
        } => password(
            password_length.unwrap_or(DEFAULT_PASSWORD_LENGTH),
            special_chars
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_SPECIAL_CHARS),
        ),
        DataKind::PhoneNumber => format!(
            "({}) {:03}-{:04}",
            rng.random_range(200..=999),
            rng.random_range(200..=999),
            rng.random_range(0..=9999)
        ),
        DataKind::Date => offset_date(-rng.random_range(0..=7 * 86_400)),
        DataKind::PastDate => offset_date(-rng.random_range(86_400..=365 * 86_400)),
        DataKind::FutureDate => offset_date(rng.random_range(86_400..=365 * 86_400)),
        DataKind::City => pick(CITIES).to_string(),
        DataKind::State => pick(STATES).to_string(),
        DataKind::Country => pick(COUNTRIES).0.to_string(),
        DataKind::CountryCode => pick(COUNTRIES).1.to_string(),
        DataKind::ZipCode => format!("{:05}", rng.random_range(501..=99_950)),
        DataKind::Uuid => uuid::Uuid::new_v4().to_string(),
        DataKind::Color => format!(
            "#{:02x}{:02x}{:02x}",
            rng.random::<u8>(),
            rng.random::<u8>(),
            rng.random::<u8>()
        ),
        DataKind::Url => format!("https://www.{}", domain_name()),
        DataKind::Ipv4 => format!(
            "{}.{}.{}.{}",
            rng.random_range(1..=254),
            rng.random::<u8>(),
            rng.random::<u8>(),
            rng.random_range(1..=254)
        ),
        DataKind::Ipv6 => (0..8)
            .map(|_| format!("{:x}", rng.random::<u16>()))
            .collect::<Vec<_>>()
            .join(":"),
        DataKind::Alphanumeric => Alphanumeric.sample_string(&mut rng, 10),
    }
}

fn pick<T: Copy + Default>(items: &[T]) -> T {
    items.choose(&mut rand::rng()).copied().unwrap_or_default()
}

fn full_name() -> String {
    format!("{} {}", pick(FIRST_NAMES), pick(LAST_NAMES))
}

fn domain_name() -> String {
    format!("{}.{}", pick(WORDS), pick(DOMAIN_SUFFIXES))
}

/// 10 位小写字母数字用户名，带 `_aut` 后缀
fn email(domain: &str) -> String {
    let username = Alphanumeric
        .sample_string(&mut rand::rng(), 10)
        .to_lowercase();
    format!("{}_aut@{}", username, domain)
}

/// 至少包含小写、大写、数字、特殊字符各一个，随后打乱顺序
fn password(length: usize, special_chars: &str) -> String {
    let mut rng = rand::rng();
    let classes = [LOWERCASE, UPPERCASE, DIGITS, special_chars];
    let all: Vec<char> = classes.iter().flat_map(|c| c.chars()).collect();

    let mut chars: Vec<char> = classes
        .iter()
        .filter_map(|class| class.chars().collect::<Vec<_>>().choose(&mut rng).copied())
        .collect();

    while chars.len() < length {
        if let Some(c) = all.choose(&mut rng) {
            chars.push(*c);
        }
    }

    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

fn offset_date(offset_seconds: i64) -> String {
    (Utc::now() + TimeDelta::seconds(offset_seconds)).to_rfc3339_opts(SecondsFormat::Millis, true)
}
