//! Icon tags attached to list items.

/// Icon catalogue: (tag, label).
pub const AVAILABLE_ICONS: &[(&str, &str)] = &[
    ("Number", "숫자 (1,2,3,4)"),
    ("Zap", "번개"),
    ("Heart", "하트"),
    ("Star", "별"),
    ("Users", "사람들"),
    ("Target", "타겟"),
    ("TrendingUp", "상승"),
    ("Globe", "지구"),
    ("Sprout", "새싹"),
    ("Lightbulb", "전구"),
    ("Award", "상"),
];

/// Tags attached when a list is created without explicit icons.
pub const DEFAULT_ICON_NAMES: [&str; 4] = ["Zap", "Sprout", "Globe", "TrendingUp"];

/// Tag used for unknown icon names.
pub const FALLBACK_ICON: &str = "Zap";

pub fn is_known_icon(name: &str) -> bool {
    AVAILABLE_ICONS.iter().any(|(tag, _)| *tag == name)
}

/// Icon tags for `count` list rows: the given names in order, unknown names
/// replaced by [`FALLBACK_ICON`], and the default tags when none are given.
pub fn resolve_icons(names: &[String], count: usize) -> Vec<&str> {
    (0..count)
        .map(|i| {
            if names.is_empty() {
                DEFAULT_ICON_NAMES[i % DEFAULT_ICON_NAMES.len()]
            } else {
                match names.get(i) {
                    Some(n) if is_known_icon(n) => n.as_str(),
                    _ => FALLBACK_ICON,
                }
            }
        })
        .collect()
}
