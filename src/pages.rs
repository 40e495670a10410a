//! Server-rendered HTML pages.

use crate::checkout::{PaymentQuote, QR_SUBDIR};

/// Minimal HTML escaping for text display.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }}
section {{ border: 1px solid #ddd; border-radius: 6px; padding: 1rem; margin-bottom: 1rem; }}
pre {{ background: #f6f6f6; padding: .5rem; overflow-x: auto; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = html_escape(title),
        body = body
    )
}

pub fn login(error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error">{}</p>"#, html_escape(e)))
        .unwrap_or_default();
    layout(
        "Login",
        &format!(
            r#"{error}
<form method="post" action="/login">
  <input type="password" name="password" autofocus>
  <button type="submit">Log in</button>
</form>"#
        ),
    )
}

const DASHBOARD_SCRIPT: &str = r#"
async function post(url, body) {
  const res = await fetch(url, { method: 'POST', body });
  return res.json();
}
document.getElementById('run-no-args').onclick = async () => {
  document.getElementById('script-output').textContent = (await post('/run_script_no_args')).output;
};
document.getElementById('run-with-args').onclick = async () => {
  const form = new URLSearchParams({ arg: document.getElementById('script-arg').value });
  document.getElementById('script-output').textContent = (await post('/run_script_with_args', form)).output;
};

async function capture(kind, field, url) {
  const stream = await navigator.mediaDevices.getUserMedia(kind === 'video' ? { video: true, audio: true } : { audio: true });
  const recorder = new MediaRecorder(stream);
  const chunks = [];
  recorder.ondataavailable = e => chunks.push(e.data);
  recorder.onstop = async () => {
    stream.getTracks().forEach(t => t.stop());
    const body = new FormData();
    body.append(field, new Blob(chunks, { type: 'video/webm' }), field + '.webm');
    document.getElementById(kind + '-status').textContent = JSON.stringify(await post(url, body));
  };
  recorder.start();
  setTimeout(() => recorder.stop(), 5000);
}
document.getElementById('record-video').onclick = () => capture('video', 'video', '/record_video');
document.getElementById('record-audio').onclick = () => capture('audio', 'audio', '/record_message');

let samples = [];
let motion = { gx: 0, gy: 0, gz: 0 };
window.addEventListener('devicemotion', e => {
  const r = e.rotationRate || {};
  motion = { gx: r.alpha || 0, gy: r.beta || 0, gz: r.gamma || 0 };
});
document.getElementById('track').onclick = () => {
  navigator.geolocation.watchPosition(pos => {
    samples.push({ timestamp: Date.now(), lat: pos.coords.latitude, lon: pos.coords.longitude, ...motion });
  });
  setInterval(async () => {
    if (samples.length === 0) return;
    const data = samples; samples = [];
    await fetch('/record_movement', { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify({ data }) });
  }, 10000);
};

async function show(url, target) {
  const res = await fetch(url);
  document.getElementById(target).textContent = JSON.stringify(await res.json(), null, 2);
}
document.getElementById('show-archive').onclick = () => show('/get_archive', 'archive');
document.getElementById('show-videos').onclick = () => show('/get_videos', 'archive');
document.getElementById('show-movement').onclick = () => show('/get_movement', 'archive');
document.getElementById('show-logs').onclick = () => show('/get_logs', 'archive');
"#;

pub fn dashboard() -> String {
    let body = format!(
        r#"<p><a href="/ecommerce">Shop</a> | <a href="/qr">QR generator</a> | <a href="/show_smiley">Smiley</a> | <a href="/logout">Log out</a></p>
<section>
  <h2>Scripts</h2>
  <button id="run-no-args">Run script</button>
  <input id="script-arg" placeholder="argument">
  <button id="run-with-args">Run with argument</button>
  <pre id="script-output"></pre>
</section>
<section>
  <h2>Capture</h2>
  <button id="record-video">Record 5s video</button> <span id="video-status"></span><br>
  <button id="record-audio">Record 5s message</button> <span id="audio-status"></span>
</section>
<section>
  <h2>Movement</h2>
  <button id="track">Start tracking</button>
</section>
<section>
  <h2>Archive</h2>
  <button id="show-archive">Messages</button>
  <button id="show-videos">Videos</button>
  <button id="show-movement">Movement</button>
  <button id="show-logs">Logs</button>
  <pre id="archive"></pre>
</section>
<script>{DASHBOARD_SCRIPT}</script>"#
    );
    layout("Portal", &body)
}

pub fn ecommerce() -> String {
    layout(
        "Shop",
        r#"<form method="post" action="/checkout">
  <p>Apples (1 EUR) <input type="number" name="apples" min="0" value="0"></p>
  <p>Bananas (2 EUR) <input type="number" name="bananas" min="0" value="0"></p>
  <p>Name <input name="name"></p>
  <p>Address <input name="address"></p>
  <p>Email <input type="email" name="email"></p>
  <button type="submit">Pay with Bitcoin</button>
</form>
<p><a href="/">Back</a></p>"#,
    )
}

fn qr_image(filename: &str) -> String {
    format!(
        r#"<p><img src="/static/{}/{}" alt="QR code" width="240" height="240"></p>"#,
        QR_SUBDIR,
        html_escape(filename)
    )
}

pub fn receipt(quote: &PaymentQuote) -> String {
    let rate_note = if quote.rate_is_fallback {
        " (fallback rate)"
    } else {
        ""
    };
    let body = format!(
        r#"<p>Total: {:.2} EUR = {:.8} BTC at {:.2} EUR/BTC{}</p>
<p>Transaction: <code>{}</code></p>
<p>Pay to: <code>{}</code></p>
{}
<p>QR file: {}</p>
<p><a href="/ecommerce">New order</a> | <a href="/">Back</a></p>"#,
        quote.total_eur,
        quote.total_btc,
        quote.btc_rate,
        rate_note,
        html_escape(&quote.tx_hash),
        html_escape(&quote.payment_uri),
        qr_image(&quote.qr_filename),
        html_escape(&quote.qr_filename),
    );
    layout("Receipt", &body)
}

/// QR generator form, with the last generated image if any
pub fn qr(generated: Option<&str>, error: Option<&str>) -> String {
    let result = match (generated, error) {
        (_, Some(error)) => format!(r#"<p class="error">{}</p>"#, html_escape(error)),
        (Some(filename), None) => format!("{}<p>QR file: {}</p>", qr_image(filename), html_escape(filename)),
        (None, None) => String::new(),
    };
    let body = format!(
        r#"<form method="post" action="/qr">
  <p>
    <label><input type="radio" name="qr_type" value="url" checked> URL</label>
    <label><input type="radio" name="qr_type" value="text"> Text</label>
    <label><input type="radio" name="qr_type" value="btc"> Bitcoin</label>
  </p>
  <p>URL <input name="url"></p>
  <p>Text <textarea name="text"></textarea></p>
  <p>BTC address <input name="btc_address"> amount <input name="btc_amount"></p>
  <button type="submit">Generate</button>
</form>
{result}
<p><a href="/">Back</a></p>"#
    );
    layout("QR generator", &body)
}

pub fn smiley() -> String {
    layout(
        "Smiley",
        r#"<svg width="200" height="200" viewBox="0 0 100 100">
  <circle cx="50" cy="50" r="45" fill="gold" stroke="black" stroke-width="2"/>
  <circle cx="35" cy="38" r="5"/>
  <circle cx="65" cy="38" r="5"/>
  <path d="M 28 60 Q 50 82 72 60" fill="none" stroke="black" stroke-width="3"/>
</svg>
<p><a href="/">Back</a></p>"#,
    )
}
