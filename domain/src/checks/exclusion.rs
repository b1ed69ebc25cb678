use super::raw::RawCheck;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| pattern.as_ref().trim().to_lowercase())
            .filter(|pattern| !pattern.is_empty())
            .collect();

        Self { patterns }
    }

    pub fn parse(value: &str) -> Self {
        Self::new(value.split(','))
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn excludes(&self, name: Option<&str>) -> bool {
        let Some(name) = name else {
            return false;
        };

        let name = name.to_lowercase();
        self.patterns
            .iter()
            .any(|pattern| name.contains(pattern.as_str()))
    }

    pub fn split(&self, checks: Vec<RawCheck>) -> (Vec<RawCheck>, Vec<RawCheck>) {
        checks
            .into_iter()
            .partition(|check| !self.excludes(check.name()))
    }

    pub fn filter(&self, checks: Vec<RawCheck>) -> Vec<RawCheck> {
        self.split(checks).0
    }
}
