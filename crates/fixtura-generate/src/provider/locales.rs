use std::fmt;

/// Locale data sets shipped by the `fake` crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocaleKey {
    En,
    FrFr,
    DeDe,
    PtBr,
    JaJp,
    ZhCn,
    ZhTw,
}

pub const DEFAULT_LOCALE: &str = "en";

impl LocaleKey {
    pub const ALL: [LocaleKey; 7] = [
        Self::En,
        Self::FrFr,
        Self::DeDe,
        Self::PtBr,
        Self::JaJp,
        Self::ZhCn,
        Self::ZhTw,
    ];

    /// Resolves a BCP-47 tag (`en`, `fr-FR`, `pt_BR`, `zh-Hant-TW`) by its
    /// language subtag; the region only matters for Chinese.
    pub fn resolve(tag: &str) -> Option<Self> {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        let mut subtags = normalized.split('-');
        let language = subtags.next()?;
        let rest: Vec<&str> = subtags.collect();
        match language {
            "en" => Some(Self::En),
            "fr" => Some(Self::FrFr),
            "de" => Some(Self::DeDe),
            "pt" => Some(Self::PtBr),
            "ja" => Some(Self::JaJp),
            "zh" => {
                let traditional = rest
                    .iter()
                    .any(|subtag| matches!(*subtag, "tw" | "hk" | "mo" | "hant"));
                Some(if traditional { Self::ZhTw } else { Self::ZhCn })
            }
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::FrFr => "fr-FR",
            Self::DeDe => "de-DE",
            Self::PtBr => "pt-BR",
            Self::JaJp => "ja-JP",
            Self::ZhCn => "zh-CN",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
