//! Inline button payloads.
//!
//! Payloads are `_`-delimited: `REGISTER_<slug>_<name>`, `REMOVE_<slug>`,
//! `NO`, or a bare slug for a restaurant selection. The name is everything
//! after the second delimiter and may itself contain `_`; slugs never do.

use crate::utils::validation::validate_slug;

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_CALLBACK_BYTES: usize = 64;

const REGISTER: &str = "REGISTER";
const REMOVE: &str = "REMOVE";
/// Payload of the "No" button.
pub const DECLINE: &str = "NO";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// A search result was picked
    Select { slug: String },
    /// "Yes" to a reopening notification
    Register { slug: String, name: String },
    /// "Remove" under a `/show` entry
    Remove { slug: String },
    /// "No" to a reopening notification
    Decline,
}

impl CallbackAction {
    /// Payload string, or `None` when the slug cannot be carried intact.
    ///
    /// `Register` names are cut on a character boundary, and dropped
    /// altogether for long slugs, so the payload fits in
    /// [`MAX_CALLBACK_BYTES`].
    pub fn encode(&self) -> Option<String> {
        if let Some(slug) = self.slug() {
            validate_slug(slug).ok()?;
        }

        let payload = match self {
            CallbackAction::Select { slug } => {
                if [REGISTER, REMOVE, DECLINE].contains(&slug.as_str()) {
                    return None;
                }
                slug.clone()
            }
            CallbackAction::Remove { slug } => format!("{REMOVE}_{slug}"),
            CallbackAction::Decline => DECLINE.to_string(),
            CallbackAction::Register { slug, name } => {
                let prefix = format!("{REGISTER}_{slug}");
                match MAX_CALLBACK_BYTES.checked_sub(prefix.len() + 1) {
                    Some(budget) if budget > 0 && !name.is_empty() => {
                        format!("{prefix}_{}", truncate_bytes(name, budget))
                    }
                    _ => prefix,
                }
            }
        };

        (payload.len() <= MAX_CALLBACK_BYTES).then_some(payload)
    }

    /// Decodes a payload; `None` for empty data or a missing/invalid slug.
    pub fn parse(data: &str) -> Option<Self> {
        if data == DECLINE {
            return Some(CallbackAction::Decline);
        }

        let mut parts = data.splitn(3, '_');
        let action = parts.next()?;

        let decoded = match action {
            REGISTER => CallbackAction::Register {
                slug: parts.next()?.to_string(),
                name: parts.next().unwrap_or_default().to_string(),
            },
            REMOVE => CallbackAction::Remove {
                slug: parts.next()?.to_string(),
            },
            _ => CallbackAction::Select {
                slug: data.to_string(),
            },
        };

        validate_slug(decoded.slug()?).ok()?;
        Some(decoded)
    }

    pub fn slug(&self) -> Option<&str> {
        match self {
            CallbackAction::Select { slug }
            | CallbackAction::Register { slug, .. }
            | CallbackAction::Remove { slug } => Some(slug),
            CallbackAction::Decline => None,
        }
    }
}

fn truncate_bytes(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_name_keeps_underscores() {
        let action = CallbackAction::parse("REGISTER_taco-bell_Taco_Bell_TLV").unwrap();
        assert_eq!(
            action,
            CallbackAction::Register {
                slug: "taco-bell".to_string(),
                name: "Taco_Bell_TLV".to_string()
            }
        );
    }

    #[test]
    fn test_register_without_name() {
        assert_eq!(
            CallbackAction::parse("REGISTER_taco-bell"),
            Some(CallbackAction::Register {
                slug: "taco-bell".to_string(),
                name: String::new()
            })
        );
    }

    #[test]
    fn test_remove_and_decline() {
        assert_eq!(
            CallbackAction::parse("REMOVE_sushi-bar"),
            Some(CallbackAction::Remove {
                slug: "sushi-bar".to_string()
            })
        );
        assert_eq!(CallbackAction::parse("NO"), Some(CallbackAction::Decline));
    }

    #[test]
    fn test_bare_slug_is_selection() {
        assert_eq!(
            CallbackAction::parse("pizza-hut-ramat-gan"),
            Some(CallbackAction::Select {
                slug: "pizza-hut-ramat-gan".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_payloads() {
        assert_eq!(CallbackAction::parse(""), None);
        assert_eq!(CallbackAction::parse("REMOVE_"), None);
        assert_eq!(CallbackAction::parse("REGISTER"), None);
        assert_eq!(CallbackAction::parse("settings:close"), None);
    }

    #[test]
    fn test_register_payload_fits_telegram_limit() {
        let action = CallbackAction::Register {
            slug: "hummus-abu-hassan-jaffa".to_string(),
            name: "חומוס אבו חסן - המקורי מיפו העתיקה".to_string(),
        };
        let encoded = action.encode().unwrap();
        assert!(encoded.len() <= MAX_CALLBACK_BYTES);
        assert!(encoded.starts_with("REGISTER_hummus-abu-hassan-jaffa_חומוס"));

        match CallbackAction::parse(&encoded) {
            Some(CallbackAction::Register { slug, .. }) => assert_eq!(slug, "hummus-abu-hassan-jaffa"),
            other => panic!("unexpected decode: {other:?}"),
        }
    }

    #[test]
    fn test_short_payloads_unchanged() {
        let action = CallbackAction::Register {
            slug: "abc".to_string(),
            name: "A_B".to_string(),
        };
        assert_eq!(action.encode().as_deref(), Some("REGISTER_abc_A_B"));
        assert_eq!(CallbackAction::parse(&action.encode().unwrap()), Some(action));
    }

    #[test]
    fn test_long_slug_drops_register_name() {
        let slug = "burger-bar-dizengoff-center-tel-aviv-yafo-north-branch";
        assert_eq!(slug.len(), 54);
        let action = CallbackAction::Register {
            slug: slug.to_string(),
            name: "Burger Bar".to_string(),
        };

        let encoded = action.encode().unwrap();
        assert_eq!(encoded, format!("REGISTER_{slug}"));
        assert_eq!(
            CallbackAction::parse(&encoded),
            Some(CallbackAction::Register {
                slug: slug.to_string(),
                name: String::new()
            })
        );
    }

    #[test]
    fn test_register_payload_never_exceeds_limit() {
        let slug = "burger-bar-dizengoff-center-tel-aviv-yafo-north-branch-2";
        assert_eq!(slug.len(), 56);
        let action = CallbackAction::Register {
            slug: slug.to_string(),
            name: "Burger Bar".to_string(),
        };
        assert_eq!(action.encode(), None);

        for len in 1..=MAX_CALLBACK_BYTES {
            let action = CallbackAction::Register {
                slug: "s".repeat(len),
                name: "שם ארוך של מסעדה".to_string(),
            };
            if let Some(encoded) = action.encode() {
                assert!(encoded.len() <= MAX_CALLBACK_BYTES, "slug of {len} bytes");
                assert_eq!(
                    CallbackAction::parse(&encoded).and_then(|a| a.slug().map(str::to_string)),
                    Some("s".repeat(len))
                );
            } else {
                assert!(len > MAX_CALLBACK_BYTES - REGISTER.len() - 1, "slug of {len} bytes");
            }
        }
    }

    #[test]
    fn test_slug_too_long_for_any_payload() {
        let slug = "a".repeat(MAX_CALLBACK_BYTES - 6);
        let register = CallbackAction::Register {
            slug: slug.clone(),
            name: "A".to_string(),
        };
        assert_eq!(register.encode(), None);
        assert_eq!(CallbackAction::Remove { slug: slug.clone() }.encode(), None);
        assert!(CallbackAction::Select { slug }.encode().is_some());

        let slug = "a".repeat(MAX_CALLBACK_BYTES + 1);
        assert_eq!(CallbackAction::Select { slug }.encode(), None);
    }

    #[test]
    fn test_underscore_slug_is_not_encoded() {
        let register = CallbackAction::Register {
            slug: "pizza_place".to_string(),
            name: "Pizza".to_string(),
        };
        assert_eq!(register.encode(), None);
        assert_eq!(
            CallbackAction::Select {
                slug: "pizza_place".to_string()
            }
            .encode(),
            None
        );
        assert_eq!(CallbackAction::parse("pizza_place"), None);
    }

    #[test]
    fn test_keyword_slug_is_not_a_selection() {
        for slug in ["NO", "REGISTER", "REMOVE"] {
            let action = CallbackAction::Select {
                slug: slug.to_string(),
            };
            assert_eq!(action.encode(), None, "{slug}");
        }
        assert_eq!(CallbackAction::Decline.encode().as_deref(), Some("NO"));
    }
}
