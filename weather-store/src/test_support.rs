//! Provider-shaped fixtures for unit tests.

use common::models::ForecastBundle;
use serde_json::{Value, json};

pub fn bundle_json(city: &str, temp_c: f64) -> Value {
    let condition = json!({
        "text": "Partly cloudy",
        "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png",
        "code": 1003
    });

    let days: Vec<Value> = (1..=7)
        .map(|d| {
            let date = format!("2024-06-{:02}", d);
            let hours: Vec<Value> = (0..3)
                .map(|h| {
                    json!({
                        "time": format!("{} {:02}:00", date, h),
                        "time_epoch": 1717200000 + h * 3600,
                        "temp_c": temp_c - 1.0,
                        "temp_f": (temp_c - 1.0) * 9.0 / 5.0 + 32.0,
                        "precip_mm": 0.1,
                        "wind_kph": 7.2,
                        "chance_of_rain": 10,
                        "condition": condition
                    })
                })
                .collect();

            json!({
                "date": date,
                "date_epoch": 1717200000 + (d - 1) * 86400,
                "day": {
                    "maxtemp_c": temp_c + 4.0,
                    "maxtemp_f": (temp_c + 4.0) * 9.0 / 5.0 + 32.0,
                    "mintemp_c": temp_c - 4.0,
                    "mintemp_f": (temp_c - 4.0) * 9.0 / 5.0 + 32.0,
                    "avgtemp_c": temp_c,
                    "avgtemp_f": temp_c * 9.0 / 5.0 + 32.0,
                    "totalprecip_mm": 1.5,
                    "maxwind_kph": 14.4,
                    "avghumidity": 60,
                    "condition": condition
                },
                "astro": { "sunrise": "05:47 AM", "sunset": "09:51 PM" },
                "hour": hours
            })
        })
        .collect();

    json!({
        "location": {
            "name": city,
            "region": "",
            "country": "Somewhere",
            "lat": 48.87,
            "lon": 2.33,
            "tz_id": "Europe/Paris",
            "localtime_epoch": 1717236000,
            "localtime": "2024-06-01 12:00"
        },
        "current": {
            "last_updated": "2024-06-01 11:45",
            "temp_c": temp_c,
            "temp_f": temp_c * 9.0 / 5.0 + 32.0,
            "is_day": 1,
            "condition": condition,
            "wind_kph": 11.2,
            "wind_dir": "WSW",
            "pressure_mb": 1016.0,
            "humidity": 58,
            "feelslike_c": temp_c,
            "feelslike_f": temp_c * 9.0 / 5.0 + 32.0,
            "vis_km": 10.0,
            "uv": 5.0
        },
        "forecast": { "forecastday": days }
    })
}

pub fn bundle(city: &str, temp_c: f64) -> ForecastBundle {
    serde_json::from_value(bundle_json(city, temp_c)).expect("fixture matches model")
}
