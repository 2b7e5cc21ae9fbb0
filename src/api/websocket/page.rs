//! Dashboard page served to browsers

/// Fixed path of the socket feed
pub const DATA_SOURCE_PATH: &str = "/dataSource";

/// Fixed path of the health check
pub const HEALTH_PATH: &str = "/health";

const URL_PLACEHOLDER: &str = "{{FEED_URL}}";

const CLIENT_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>LCD Events</title>
    <script>
window.addEventListener("load", function(evt) {
    var output = document.getElementById("output");
    var ws;
    var print = function(message) {
        var d = document.createElement("div");
        d.textContent = message;
        output.appendChild(d);
    };
    document.getElementById("open").onclick = function(evt) {
        if (ws) {
            return false;
        }
        ws = new WebSocket({{FEED_URL}});
        ws.onopen = function(evt) {
            print("Connection Opened");
        };
        ws.onclose = function(evt) {
            print("Connection Closed");
            ws = null;
        };
        ws.onmessage = function(evt) {
            print(evt.data);
        };
        ws.onerror = function(evt) {
            print("ERROR: " + evt.data);
        };
        return false;
    };
    document.getElementById("close").onclick = function(evt) {
        if (!ws) {
            return false;
        }
        ws.close();
        return false;
    };
});
    </script>
</head>
<body>
    <p>Click "Open" to create a connection to the server and "Close" to close the connection.</p>
    <form>
        <button id="open">Open</button>
        <button id="close">Close</button>
    </form>
    <div id="output"></div>
</body>
</html>
"#;

/// Feed URL browsers connect to for `host`
pub fn feed_url(host: &str) -> String {
    format!("ws://{}{}", host, DATA_SOURCE_PATH)
}

/// Render the page with the feed URL embedded as a JS string literal
pub fn render(host: &str) -> String {
    let literal = serde_json::Value::String(feed_url(host)).to_string();
    CLIENT_PAGE.replace(URL_PLACEHOLDER, &literal)
}
