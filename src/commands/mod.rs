pub mod diff;
pub mod generate;
pub mod render;

/// Split `-D key=value` arguments; entries without `=` are ignored.
pub fn parse_data(data: Vec<String>) -> Vec<(String, String)> {
    data.into_iter()
        .filter_map(|kv| {
            let mut parts = kv.splitn(2, '=');
            let key = parts.next()?.to_string();
            let value = parts.next()?.to_string();
            Some((key, value))
        })
        .collect()
}
