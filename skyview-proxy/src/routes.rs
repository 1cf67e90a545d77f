use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::relay::{ForecastQuery, ProxyReply, Relay, WeatherQuery};

pub fn routes(relay: Relay) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let weather = warp::get()
        .and(warp::path!("weather"))
        .and(warp::query::<WeatherQuery>())
        .and(with_relay(relay.clone()))
        .and_then(get_weather);

    let forecast = warp::get()
        .and(warp::path!("forecast"))
        .and(warp::query::<ForecastQuery>())
        .and(with_relay(relay))
        .and_then(get_forecast);

    weather
        .or(forecast)
        .with(warp::log::custom(|info| {
            tracing::info!("{} {} -> {}", info.method(), info.path(), info.status());
        }))
        .recover(rejection)
}

fn with_relay(relay: Relay) -> impl Filter<Extract = (Relay,), Error = Infallible> + Clone {
    warp::any().map(move || relay.clone())
}

pub async fn get_weather(query: WeatherQuery, relay: Relay) -> Result<impl Reply, Rejection> {
    Ok(into_reply(relay.current(query).await))
}

pub async fn get_forecast(query: ForecastQuery, relay: Relay) -> Result<impl Reply, Rejection> {
    Ok(into_reply(relay.forecast(query).await))
}

fn into_reply(reply: ProxyReply) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    warp::reply::with_status(warp::reply::json(&reply.body), status)
}

#[derive(Serialize)]
struct ErrorMessage {
    error: String,
}

pub async fn rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string.")
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
    };

    let json = warp::reply::json(&ErrorMessage {
        error: message.into(),
    });

    Ok(warp::reply::with_status(json, code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn relay(upstream: &str, key: Option<&str>) -> Relay {
        let mut pairs = vec![("UPSTREAM_URL".to_string(), upstream.to_string())];
        if let Some(key) = key {
            pairs.push(("OPENWEATHER_KEY".to_string(), key.to_string()));
        }
        Relay::new(&Settings::from_pairs(pairs).unwrap())
    }

    fn body(res: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    #[tokio::test]
    async fn weather_without_key_is_500() {
        let filter = routes(relay("http://127.0.0.1:9", None));

        let res = warp::test::request()
            .method("GET")
            .path("/weather?q=London&units=metric")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), 500);
        assert_eq!(body(&res), json!({ "error": "API key not defined!" }));
    }

    #[tokio::test]
    async fn forecast_is_proxied() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .and(query_param("q", "New York"))
            .and(query_param("appid", "secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "list": [] })),
            )
            .expect(1)
            .mount(&upstream)
            .await;

        let filter = routes(relay(&upstream.uri(), Some("secret")));
        let res = warp::test::request()
            .method("GET")
            .path("/forecast?endpoint=forecast&q=New%20York&units=metric")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), 200);
        assert_eq!(body(&res), json!({ "list": [] }));
    }

    #[tokio::test]
    async fn upstream_status_is_relayed() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(404).set_body_string("city not found"))
            .mount(&upstream)
            .await;

        let filter = routes(relay(&upstream.uri(), Some("secret")));
        let res = warp::test::request()
            .method("GET")
            .path("/weather?q=Zzzznotacity")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), 404);
        assert_eq!(
            body(&res)["error"],
            "City not found or API error: Not Found"
        );
    }

    #[tokio::test]
    async fn unknown_path_is_json_404() {
        let filter = routes(relay("http://127.0.0.1:9", Some("secret")));
        let res = warp::test::request()
            .method("GET")
            .path("/nope")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), 404);
        assert_eq!(body(&res)["error"], "Not found.");
    }

    #[tokio::test]
    async fn post_is_not_allowed() {
        let filter = routes(relay("http://127.0.0.1:9", Some("secret")));
        let res = warp::test::request()
            .method("POST")
            .path("/weather")
            .reply(&filter)
            .await;

        assert_eq!(res.status(), 405);
    }
}
