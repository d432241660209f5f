pub fn generate_starter_config() -> String {
    r#"# =============================================================================
# LOGTALLY CONFIGURATION
# =============================================================================
# Each source is tokenized into records and fields, mapped into entries with a
# timestamp, and counted in fixed-width time buckets. Every change to a source
# recomputes its buckets from the full current content.
#
# Config file locations (in order of precedence):
#   1. Path specified via --config argument
#   2. ~/.config/logtally/config.yml
#   3. /etc/logtally/config.yml

# =============================================================================
# SOURCES
# =============================================================================
# location:     file path, or http(s) URL fetched with GET
# delimiters:   regular expressions; every key is optional
#   record:     splits the content into records       (default '\n')
#   field:      splits a record into fields            (default '[-"]')
#   trim:       stripped from every trimmed field      (default '["\[\]]')
# timestamp:    field index and format; format is a strptime string,
#               'iso8601', 'epoch', or 'epoch_ms'
# fields:       index -> name; kind is string (default), int, or float.
#               Indices past the end of a record leave the field absent.
# bucket_width: bucket size, e.g. 5m, 10m, 1h (default 5m)

sources:
  - name: apache.access
    location: var/log/apache/access.log
    timestamp:
      index: 2
      format: '%d/%b/%Y:%H:%M:%S %z'
    fields:
      - { index: 0, name: ip }
      - { index: 3, name: request }
      - { index: 4, name: status, kind: int }
      - { index: 8, name: agent }
    bucket_width: 5m

  - name: mysql.slow-queries
    location: var/log/mysql/slow-queries.log
    delimiters:
      record: '# Time:'
      field: '\n'
      trim: '[#"\[\]]'
    timestamp:
      index: 0
      format: '%y%m%d %H:%M:%S'
    fields:
      - { index: 1, name: host }
      - { index: 2, name: query }
    bucket_width: 5m

  - name: nginx.access
    location: var/log/nginx/access.log
    timestamp:
      index: 2
      format: '%d/%b/%Y:%H:%M:%S %z'
    fields:
      - { index: 0, name: ip }
      - { index: 3, name: request }
      - { index: 4, name: status, kind: int }
      - { index: 8, name: agent }
    bucket_width: 5m

  - name: nginx.error
    location: var/log/nginx/error.log
    delimiters:
      field: '\[|\]\]'
    timestamp:
      index: 0
      format: '%Y/%m/%d %H:%M:%S'
    fields:
      - { index: 1, name: level }
      - { index: 2, name: message }
    bucket_width: 5m

# =============================================================================
# TRANSPORT
# =============================================================================
# Files are polled for changes and re-read in full. URLs are re-fetched on
# every poll when follow is true, otherwise fetched once.

transport:
  poll_interval: 1s
  follow: true

# =============================================================================
# WEB
# =============================================================================
# HTTP API serving the current buckets of every source.

web:
  listen: 127.0.0.1:3000
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_starter_config_is_valid() {
        let config = parse_config(&generate_starter_config()).unwrap();

        let names: Vec<&str> = config.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["apache.access", "mysql.slow-queries", "nginx.access", "nginx.error"]
        );
        let mysql = config.source("mysql.slow-queries").unwrap();
        assert_eq!(mysql.delimiters.record, "# Time:");
        assert_eq!(mysql.delimiters.field, r"\n");
    }
}
