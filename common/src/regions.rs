//! イングランド地域マスタ
//!
//! 地域フィルタ（地域を選ぶとカウンティ欄を埋める）と、
//! 比較レポートの地域並び順で使う。

/// 地域定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub name: &'static str,
    pub code: &'static str,
    pub counties: &'static [&'static str],
}

/// イングランドの8地域（表示順）
pub const ENGLAND_REGIONS: [Region; 8] = [
    Region {
        name: "North West",
        code: "NW",
        counties: &["Cheshire", "Cumbria", "Greater Manchester", "Lancashire", "Merseyside"],
    },
    Region {
        name: "North East",
        code: "NE",
        counties: &["County Durham", "Northumberland", "Tyne and Wear"],
    },
    Region {
        name: "West Midlands",
        code: "WM",
        counties: &[
            "Herefordshire",
            "Shropshire",
            "Staffordshire",
            "Warwickshire",
            "West Midlands",
            "Worcestershire",
        ],
    },
    Region {
        name: "East Midlands",
        code: "EM",
        counties: &[
            "Derbyshire",
            "Leicestershire",
            "Lincolnshire",
            "Northamptonshire",
            "Nottinghamshire",
            "Rutland",
        ],
    },
    Region {
        name: "East",
        code: "E",
        counties: &[
            "Bedfordshire",
            "Cambridgeshire",
            "Essex",
            "Hertfordshire",
            "Norfolk",
            "Suffolk",
        ],
    },
    Region {
        name: "South West",
        code: "SW",
        counties: &[
            "Bristol",
            "Cornwall",
            "Devon",
            "Dorset",
            "Gloucestershire",
            "Somerset",
            "Wiltshire",
        ],
    },
    Region {
        name: "South East",
        code: "SE",
        counties: &[
            "Berkshire",
            "Buckinghamshire",
            "East Sussex",
            "Hampshire",
            "Isle of Wight",
            "Kent",
            "Oxfordshire",
            "Surrey",
            "West Sussex",
        ],
    },
    Region {
        name: "London",
        code: "L",
        counties: &["Greater London"],
    },
];

/// 名前またはコードで地域を探す（大文字小文字は無視）
pub fn find_region(name_or_code: &str) -> Option<&'static Region> {
    let key = name_or_code.trim();
    ENGLAND_REGIONS
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(key) || r.code.eq_ignore_ascii_case(key))
}

/// 選択した地域のカウンティの和集合（重複除去、最初に出た順）
///
/// 未知の地域名は無視する。空の選択は空のVecを返す（＝フィルタ解除）。
pub fn counties_for_regions<S: AsRef<str>>(selected: &[S]) -> Vec<String> {
    let mut counties: Vec<String> = Vec::new();
    for name in selected {
        if let Some(region) = find_region(name.as_ref()) {
            for county in region.counties {
                if !counties.iter().any(|c| c == county) {
                    counties.push((*county).to_string());
                }
            }
        }
    }
    counties
}

/// カウンティ名を正規化
///
/// - "london" を含むものはすべて "Greater London"
/// - 末尾の county/borough/city などの接尾語を除去
/// - 単語ごとに先頭大文字
pub fn normalize_county(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if lower.is_empty() {
        return String::new();
    }
    if lower.contains("london") {
        return "Greater London".to_string();
    }

    const SUFFIXES: [&str; 9] = [
        "county",
        "unitary",
        "borough",
        "city",
        "metropolitan",
        "royal",
        "district",
        "council",
        "region",
    ];

    let mut words: Vec<&str> = lower.split_whitespace().collect();
    if words.len() > 1 {
        if let Some(last) = words.last() {
            if SUFFIXES.contains(last) {
                words.pop();
            }
        }
    }

    words
        .iter()
        .map(|w| title_case(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// カウンティが属する地域名
pub fn region_for_county(county: &str) -> Option<&'static str> {
    let normalized = normalize_county(county);
    ENGLAND_REGIONS
        .iter()
        .find(|r| r.counties.iter().any(|c| normalize_county(c) == normalized))
        .map(|r| r.name)
}

/// 地域の表示順インデックス（未知の地域は末尾）
pub fn region_order(name: &str) -> usize {
    ENGLAND_REGIONS
        .iter()
        .position(|r| r.name == name)
        .unwrap_or(ENGLAND_REGIONS.len())
}

/// カウンティ欄の入力（カンマ区切り）をVecに
pub fn parse_county_list(input: &str) -> Vec<String> {
    let mut counties: Vec<String> = Vec::new();
    for part in input.split(',') {
        let county = part.trim();
        if !county.is_empty() && !counties.iter().any(|c| c.eq_ignore_ascii_case(county)) {
            counties.push(county.to_string());
        }
    }
    counties
}

/// カウンティ欄に表示する文字列
pub fn format_county_list(counties: &[String]) -> String {
    counties.join(", ")
}
