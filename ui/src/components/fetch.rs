//! Browser `fetch` implementation of [`HttpTransport`].

use board_common::http::{HttpRequest, HttpResponse, HttpTransport};

/// Sends requests with `window.fetch`. Non-2xx statuses are returned as
/// responses, not errors; only transport failures are `Err`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        fetch(request).await
    }
}

#[cfg(target_family = "wasm")]
async fn fetch(request: HttpRequest) -> Result<HttpResponse, String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let opts = web_sys::RequestInit::new();
    opts.set_method(request.method.as_str());
    opts.set_mode(web_sys::RequestMode::Cors);

    if let Some(body) = &request.body {
        opts.set_body(&wasm_bindgen::JsValue::from_str(body));
    }

    let js_request = web_sys::Request::new_with_str_and_init(&request.url, &opts)
        .map_err(|e| format!("Failed to create request: {:?}", e))?;

    if request.body.is_some() {
        js_request
            .headers()
            .set("Content-Type", "application/json")
            .map_err(|e| format!("Failed to set header: {:?}", e))?;
    }

    let window = web_sys::window().ok_or("No window")?;
    let resp_value = JsFuture::from(window.fetch_with_request(&js_request))
        .await
        .map_err(|e| format!("Fetch failed: {:?}", e))?;

    let resp: web_sys::Response = resp_value
        .dyn_into()
        .map_err(|_| "Response is not a Response object".to_string())?;

    let text = JsFuture::from(
        resp.text()
            .map_err(|e| format!("Failed to get text: {:?}", e))?,
    )
    .await
    .map_err(|e| format!("Failed to read body: {:?}", e))?;

    let body = text
        .as_string()
        .ok_or("Response body is not a string".to_string())?;

    Ok(HttpResponse {
        status: resp.status(),
        body,
    })
}

// Non-WASM stub for type checking
#[cfg(not(target_family = "wasm"))]
async fn fetch(request: HttpRequest) -> Result<HttpResponse, String> {
    Err(format!(
        "{} {}: fetch is only available in the browser",
        request.method, request.url
    ))
}
