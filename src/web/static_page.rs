//! Inline index page
//!
//! Single static document embedding the stream and a small poller for the
//! FPS readout; no frontend build step.

/// Index page HTML
pub fn index_html() -> &'static str {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Live Stream</title>
    <style>
        body { font-family: Arial, sans-serif; }
        #fps { font-size: 1.2em; margin-top: 10px; }
    </style>
</head>
<body>
    <h1>Live Stream</h1>
    <img src="/video_feed" alt="live camera feed">
    <div id="fps">FPS: Calculating...</div>
    <script>
        function fetchFPS() {
            fetch('/fps')
                .then(response => response.text())
                .then(data => {
                    document.getElementById('fps').innerText = 'FPS: ' + data;
                })
                .catch(error => console.error('Error fetching FPS:', error));
        }
        setInterval(fetchFPS, 1000);
        fetchFPS();
    </script>
</body>
</html>"#
}
