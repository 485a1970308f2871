//! Static HTML served to browsers in place of registry responses.

/// Number of mirror hostnames shown on the help page.
pub const HELP_MIRROR_SLOTS: usize = 5;

const NGINX_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Welcome to nginx!</title>
<style>
    body {
        width: 35em;
        margin: 0 auto;
        font-family: Tahoma, Verdana, Arial, sans-serif;
    }
</style>
</head>
<body>
<h1>Welcome to nginx!</h1>
<p>If you see this page, the nginx web server is successfully installed and
working. Further configuration is required.</p>

<p>For online documentation and support please refer to
<a href="http://nginx.org/">nginx.org</a>.<br/>
Commercial support is available at
<a href="http://nginx.com/">nginx.com</a>.</p>

<p><em>Thank you for using nginx.</em></p>
</body>
</html>
"#;

const HELP_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Registry mirror</title>
<style>
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
        line-height: 1.6;
        color: #333;
        margin: 0;
        padding: 20px;
    }
    .container { max-width: 800px; margin: 0 auto; }
    h1 { color: #007aff; text-align: center; }
    pre { background: #2d2d2d; color: #f8f8f2; padding: 20px; border-radius: 8px; overflow-x: auto; }
    code { font-family: "SFMono-Regular", Consolas, Menlo, monospace; font-size: 0.875em; }
</style>
</head>
<body>
<div class="container">
<h1>Registry mirror</h1>
<p>Private mirror. Please do not share it publicly.</p>
"#;

const HELP_TAIL: &str = "</div>\n</body>\n</html>\n";

/// The stock nginx welcome page.
pub fn nginx_page() -> &'static str {
    NGINX_PAGE
}

/// Mirror setup instructions listing up to five mirror hostnames.
///
/// Missing or empty entries fall back to `default-d1` .. `default-d5`.
pub fn help_page(mirrors: &[String]) -> String {
    let hosts: Vec<String> = (0..HELP_MIRROR_SLOTS)
        .map(|i| match mirrors.get(i).map(|m| m.trim()) {
            Some(host) if !host.is_empty() => escape_html(host),
            _ => format!("default-d{}", i + 1),
        })
        .collect();

    let entries = hosts
        .iter()
        .map(|host| format!("    \"https://{}\"", host))
        .collect::<Vec<_>>()
        .join(",\n");

    let mut page = String::from(HELP_HEAD);
    page.push_str("<h3>Configure the Docker daemon to use this mirror:</h3>\n<pre><code>");
    page.push_str("sudo mkdir -p /etc/docker\n");
    page.push_str("sudo tee /etc/docker/daemon.json &lt;&lt;-'EOF'\n");
    page.push_str("{\n  \"registry-mirrors\": [\n");
    page.push_str(&entries);
    page.push_str("\n  ]\n}\nEOF\n");
    page.push_str("sudo systemctl daemon-reload\nsudo systemctl restart docker</code></pre>\n");
    page.push_str("<h3>Usage</h3>\n<p>Original pull command:</p>\n");
    page.push_str("<pre><code>docker pull library/alpine:latest</code></pre>\n");
    page.push_str("<p>Pull through the mirror:</p>\n");
    page.push_str(&format!(
        "<pre><code>docker pull {}/library/alpine:latest</code></pre>\n",
        hosts[0]
    ));
    page.push_str(HELP_TAIL);
    page
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
