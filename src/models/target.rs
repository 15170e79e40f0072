/// One upstream endpoint to call for an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    /// Key under which this target's value appears in the merged response.
    pub name: String,
    pub host: String,
    pub path: String,
}

impl UpstreamTarget {
    pub fn new(host: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            host: host.to_string(),
            path: format!("/{}", name),
        }
    }

    /// Build the ordered target list for one inbound request.
    pub fn for_names(host: &str, names: &[String]) -> Vec<Self> {
        names.iter().map(|name| Self::new(host, name)).collect()
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.host, self.path)
    }
}
