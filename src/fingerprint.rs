//! Browser request identity.
//!
//! The content site serves a stripped-down (or blocking) page to clients
//! that don't look like a desktop browser, so every request carries a
//! realistic user agent and the accept headers that go with it.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT,
};

/// Browser profile with a consistent set of identity headers
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub sec_ch_ua: String,
    pub sec_ch_ua_platform: String,
}

/// Chrome releases with meaningful market share
const CHROME_VERSIONS: &[(&str, &str)] = &[
    ("131", "131.0.0.0"),
    ("130", "130.0.0.0"),
    ("129", "129.0.0.0"),
    ("128", "128.0.0.0"),
];

const FIREFOX_VERSIONS: &[&str] = &["133.0", "132.0", "131.0"];

const ACCEPT_LANGUAGES: &[&str] = &["en-US,en;q=0.5", "en-US,en;q=0.9", "en-GB,en;q=0.9"];

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

#[derive(Debug, Clone, Copy)]
enum Platform {
    MacOS,
    Windows,
    Linux,
}

impl Platform {
    fn random() -> Self {
        // Windows 70%, macOS 20%, Linux 10%
        let roll: f32 = rand::thread_rng().gen();
        if roll < 0.7 {
            Platform::Windows
        } else if roll < 0.9 {
            Platform::MacOS
        } else {
            Platform::Linux
        }
    }

    fn os_string(self) -> &'static str {
        match self {
            Platform::MacOS => "Macintosh; Intel Mac OS X 10_15_7",
            Platform::Windows => "Windows NT 10.0; Win64; x64",
            Platform::Linux => "X11; Linux x86_64",
        }
    }

    fn sec_ch_platform(self) -> &'static str {
        match self {
            Platform::MacOS => "\"macOS\"",
            Platform::Windows => "\"Windows\"",
            Platform::Linux => "\"Linux\"",
        }
    }
}

fn pick<'a>(items: &[&'a str]) -> &'a str {
    items.choose(&mut rand::thread_rng()).copied().unwrap_or(items[0])
}

/// Generate a Chrome desktop profile
#[must_use]
pub fn chrome_profile() -> BrowserProfile {
    let platform = Platform::random();
    let (major, full) = CHROME_VERSIONS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CHROME_VERSIONS[0]);

    BrowserProfile {
        user_agent: format!(
            "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{full} Safari/537.36",
            platform.os_string()
        ),
        accept: HTML_ACCEPT.to_string(),
        accept_language: pick(ACCEPT_LANGUAGES).to_string(),
        sec_ch_ua: format!(
            "\"Google Chrome\";v=\"{major}\", \"Chromium\";v=\"{major}\", \"Not_A Brand\";v=\"24\""
        ),
        sec_ch_ua_platform: platform.sec_ch_platform().to_string(),
    }
}

/// Generate a Firefox desktop profile
#[must_use]
pub fn firefox_profile() -> BrowserProfile {
    let platform = Platform::random();
    let version = pick(FIREFOX_VERSIONS);

    BrowserProfile {
        user_agent: format!(
            "Mozilla/5.0 ({}; rv:{version}) Gecko/20100101 Firefox/{version}",
            platform.os_string()
        ),
        accept: HTML_ACCEPT.to_string(),
        accept_language: pick(ACCEPT_LANGUAGES).to_string(),
        // Firefox doesn't send client hints
        sec_ch_ua: String::new(),
        sec_ch_ua_platform: String::new(),
    }
}

/// Random desktop profile, Chrome-weighted.
#[must_use]
pub fn random_profile() -> BrowserProfile {
    if rand::thread_rng().gen_bool(0.8) {
        chrome_profile()
    } else {
        firefox_profile()
    }
}

impl BrowserProfile {
    /// Convert profile to default request headers.
    ///
    /// Values that aren't valid header text are skipped rather than sent
    /// half-formed.
    #[must_use]
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let mut put = |name: HeaderName, value: &str| {
            if value.is_empty() {
                return;
            }
            if let Ok(v) = HeaderValue::from_str(value) {
                headers.insert(name, v);
            }
        };

        put(USER_AGENT, &self.user_agent);
        put(ACCEPT, &self.accept);
        put(ACCEPT_LANGUAGE, &self.accept_language);
        put(HeaderName::from_static("sec-ch-ua"), &self.sec_ch_ua);
        put(
            HeaderName::from_static("sec-ch-ua-platform"),
            &self.sec_ch_ua_platform,
        );
        if !self.sec_ch_ua.is_empty() {
            put(HeaderName::from_static("sec-ch-ua-mobile"), "?0");
        }
        put(HeaderName::from_static("upgrade-insecure-requests"), "1");

        headers
    }
}
