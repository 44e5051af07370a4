//! Browser-side reload client and HTML injection.

use super::RELOAD_PATH;

/// Marker the script is inserted in front of.
const BODY_CLOSE: &[u8] = b"</body>";

/// Script injected into served HTML pages.
///
/// Opens an event stream to the reload endpoint and reloads the page on a
/// `reload` message. On a stream error it closes the connection and does not
/// reconnect; refreshing the page opens a new stream.
pub fn reload_script() -> String {
    format!(
        r#"
<script>
  (function () {{
    var source = new EventSource("{RELOAD_PATH}");
    source.onmessage = function (e) {{
      if (e.data === "reload") {{
        console.log("Reloading page...");
        location.reload();
      }}
    }};
    source.onerror = function () {{
      console.log("Live reload stream error, closing connection.");
      source.close();
    }};
  }})();
</script>
"#
    )
}

/// Insert `script` before the first `</body>`, or append it when there is none.
///
/// Works on raw bytes so documents that are not valid UTF-8 pass through
/// unchanged outside the insertion point.
pub fn inject_script(body: &[u8], script: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + script.len());
    match find(body, BODY_CLOSE) {
        Some(pos) => {
            out.extend_from_slice(&body[..pos]);
            out.extend_from_slice(script);
            out.extend_from_slice(&body[pos..]);
        }
        None => {
            out.extend_from_slice(body);
            out.extend_from_slice(script);
        }
    }
    out
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
