use std::fmt;

/// 当前生成的立面变体标识（如 "A"、"B"），每次流水线运行时显式传入。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElevationDesignation(String);

impl ElevationDesignation {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElevationDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `"Elevation " + 标识`。
pub fn elevation_label(designation: &ElevationDesignation) -> String {
    format!("Elevation {designation}")
}

/// 保留原名第一个 `-` 之前的前缀（含尾随空格），拼接新的立面标签。
pub fn relabel_schedule_name(original: &str, designation: &ElevationDesignation) -> String {
    let prefix = original.split('-').next().unwrap_or(original);
    format!("{prefix}- {}", elevation_label(designation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relabel_keeps_prefix_before_first_dash() {
        let b = ElevationDesignation::new("B");
        assert_eq!(relabel_schedule_name("EX1 - Sheet Index Copy 1", &b), "EX1 - Elevation B");
        assert_eq!(
            relabel_schedule_name("Roof Ventilation Equipment - Elevation A Copy 1", &b),
            "Roof Ventilation Equipment - Elevation B"
        );
        assert_eq!(relabel_schedule_name("Sheet Index", &b), "Sheet Index- Elevation B");
        assert_eq!(relabel_schedule_name("-Index", &b), "- Elevation B");
        assert_eq!(elevation_label(&b), "Elevation B");
    }
}
