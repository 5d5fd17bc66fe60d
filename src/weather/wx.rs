//! Plain-language decoding of METAR/TAF present-weather groups
//! (`-SHRA BR` -> "Light rain showers, mist")

fn descriptor(code: &str) -> Option<&'static str> {
    Some(match code {
        "MI" => "shallow",
        "BC" => "patches of",
        "PR" => "partial",
        "DR" => "low drifting",
        "BL" => "blowing",
        "FZ" => "freezing",
        "TS" => "thunderstorm",
        _ => return None,
    })
}

fn phenomenon(code: &str) -> Option<&'static str> {
    Some(match code {
        "DZ" => "drizzle",
        "RA" => "rain",
        "SN" => "snow",
        "SG" => "snow grains",
        "IC" => "ice crystals",
        "PL" => "ice pellets",
        "GR" => "hail",
        "GS" => "small hail",
        "UP" => "unknown precipitation",
        "BR" => "mist",
        "FG" => "fog",
        "FU" => "smoke",
        "VA" => "volcanic ash",
        "DU" => "dust",
        "SA" => "sand",
        "HZ" => "haze",
        "PY" => "spray",
        "PO" => "dust whirls",
        "SQ" => "squalls",
        "FC" => "funnel cloud",
        "SS" => "sandstorm",
        "DS" => "duststorm",
        _ => return None,
    })
}

fn decode_group(group: &str) -> String {
    let (intensity, rest) = if let Some(rest) = group.strip_prefix('-') {
        (Some("light"), rest)
    } else if let Some(rest) = group.strip_prefix('+') {
        (Some("heavy"), rest)
    } else {
        (None, group)
    };
    let (vicinity, rest) = match rest.strip_prefix("VC") {
        Some(rest) => (true, rest),
        None => (false, rest),
    };

    if rest.is_empty() || rest.len() % 2 != 0 || !rest.is_ascii() {
        return group.to_string();
    }

    let mut words: Vec<&str> = intensity.into_iter().collect();
    let mut showers = false;
    for i in (0..rest.len()).step_by(2) {
        let code = &rest[i..i + 2];
        if code == "SH" {
            showers = true;
        } else if let Some(word) = descriptor(code).or_else(|| phenomenon(code)) {
            words.push(word);
        } else {
            return group.to_string();
        }
    }
    if showers {
        words.push("showers");
    }
    if vicinity {
        words.push("in the vicinity");
    }
    words.join(" ")
}

/// Decode a whitespace-separated weather string; empty input yields `None`
#[must_use]
pub fn decode_weather(raw: &str) -> Option<String> {
    let groups: Vec<String> = raw.split_whitespace().map(decode_group).collect();
    if groups.is_empty() {
        return None;
    }
    let text = groups.join(", ");
    let mut chars = text.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
}
