/// An example prompt offered to the user before they type their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub text: &'static str,
}

const SUGGESTIONS: &[Suggestion] = &[
    Suggestion { text: "a red fox leaping over a frozen creek at dawn" },
    Suggestion { text: "an isometric cutaway of a lighthouse interior" },
    Suggestion { text: "a watercolor map of an imaginary archipelago" },
    Suggestion { text: "a macro photograph of frost on a spider web" },
    Suggestion { text: "a retro travel poster for the rings of Saturn" },
    Suggestion { text: "a cozy reading nook inside a hollowed-out tree" },
    Suggestion { text: "a street market in the rain, neon reflections" },
    Suggestion { text: "an origami crane made of circuit boards" },
];

pub fn all_suggestions() -> &'static [Suggestion] {
    SUGGESTIONS
}

/// Deterministic rotating window over the suggestion list: `count` entries
/// starting at `offset`, wrapping around. Callers bump `offset` to rotate.
pub fn suggestion_window(offset: usize, count: usize) -> Vec<Suggestion> {
    let len = SUGGESTIONS.len();
    if len == 0 || count == 0 {
        return Vec::new();
    }
    (0..count.min(len))
        .map(|i| SUGGESTIONS[(offset + i) % len])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_wraps_and_never_exceeds_the_list() {
        let len = all_suggestions().len();
        assert!(len > 0);

        let window = suggestion_window(len - 1, 3);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0], SUGGESTIONS[len - 1]);
        assert_eq!(window[1], SUGGESTIONS[0]);

        assert_eq!(suggestion_window(0, len + 10).len(), len);
        assert!(suggestion_window(5, 0).is_empty());
    }

    #[test]
    fn rotation_is_deterministic() {
        assert_eq!(suggestion_window(2, 2), suggestion_window(2, 2));
    }
}
