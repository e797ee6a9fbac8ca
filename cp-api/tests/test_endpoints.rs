//! Integration tests for the endpoint operations.
//!
//! Each operation is checked for the request it puts on the wire and for the
//! parameter validation it performs before doing so.

mod common;

use common::{SpyTransport, DEVICE_ID, MODEL_ID, OBJECT_ID, OTHER_ID};
use cp_api::{
    DataEntry, DataQuery, DataRemoval, DeviceLocation, DeviceUpdate, EnrollPrototype, HttpMethod,
};
use cp_core::ErrorKind;
use serde_json::json;

// ---- Device ----

#[tokio::test]
async fn set_device_patches_remaining_fields() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::master_client(&spy);

    let update = DeviceUpdate {
        id: Some(DEVICE_ID.into()),
        name: Some("boiler".into()),
        status: Some("disabled".into()),
        ..Default::default()
    };
    client.set_device(&update).await.unwrap();

    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Patch);
    assert!(sent.url.ends_with(&format!("device/{DEVICE_ID}")));
    assert_eq!(common::body_json(&sent), json!({"name": "boiler", "status": "disabled"}));
}

#[tokio::test]
async fn set_device_rejects_empty_name() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    let update = DeviceUpdate {
        name: Some(String::new()),
        ..Default::default()
    };
    let err = client.set_device(&update).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(spy.count(), 0);
}

#[tokio::test]
async fn get_device_rejects_malformed_id() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::master_client(&spy);

    let err = client.get_device(Some("too-short")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(spy.count(), 0);
}

#[tokio::test]
async fn device_prop_paths_are_encoded() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    client.get_device_prop(None, Some("a#b?c")).await.unwrap();
    assert!(spy
        .last()
        .url
        .ends_with(&format!("device/{DEVICE_ID}/a%23b%3Fc")));

    client.get_device_prop(None, None).await.unwrap();
    assert!(spy.last().url.ends_with(&format!("device/{DEVICE_ID}/")));
}

#[tokio::test]
async fn set_device_prop_sends_json_value() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    client
        .set_device_prop(None, Some("threshold"), &json!(0))
        .await
        .unwrap();
    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Patch);
    assert_eq!(sent.body.as_deref(), Some("0"));

    client
        .set_device_prop(Some(OTHER_ID), None, &json!({"a": 1, "b": null}))
        .await
        .unwrap();
    let sent = spy.last();
    assert!(sent.url.ends_with(&format!("device/{OTHER_ID}/")));
    assert_eq!(common::body_json(&sent), json!({"a": 1, "b": null}));
}

#[tokio::test]
async fn set_device_prop_rejects_blank_value() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    for value in [json!(null), json!("")] {
        let err = client
            .set_device_prop(None, Some("p"), &value)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
    assert_eq!(spy.count(), 0);
}

#[tokio::test]
async fn remove_device_prop_uses_delete() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    client.remove_device_prop(None, "temp").await.unwrap();
    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Delete);
    assert!(sent.url.ends_with(&format!("device/{DEVICE_ID}/temp")));

    let err = client.remove_device_prop(None, "").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

// ---- Location ----

#[tokio::test]
async fn set_device_location_sends_coordinates() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    let mut location = DeviceLocation::new(-180.0, 90.0);
    location.altitude = Some(120.0);
    location.timestamp = Some(json!(1_400_000_000_000u64));
    client.set_device_location(&location).await.unwrap();

    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Patch);
    assert!(sent.url.ends_with(&format!("device/{DEVICE_ID}/location")));
    assert_eq!(
        common::body_json(&sent),
        json!({"x": -180.0, "y": 90.0, "z": 120.0, "t": 1_400_000_000_000u64})
    );
}

#[tokio::test]
async fn set_device_location_rejects_out_of_range() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    for (lon, lat) in [(180.5, 0.0), (-181.0, 0.0), (0.0, 90.01), (0.0, -91.0)] {
        let err = client
            .set_device_location(&DeviceLocation::new(lon, lat))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter, "({lon}, {lat})");
    }
    assert_eq!(spy.count(), 0);
}

#[tokio::test]
async fn get_device_location_uses_session_id() {
    let spy = SpyTransport::replying(200, r#"{"x":1,"y":2}"#);
    let client = common::device_client(&spy);

    let response = client.get_device_location(None).await.unwrap();
    assert_eq!(response.value().unwrap()["y"], 2);
    assert!(spy.last().url.ends_with(&format!("device/{DEVICE_ID}/location")));
}

#[tokio::test]
async fn get_device_location_rejects_non_plug_ids() {
    let spy = SpyTransport::replying(200, r#"{"x":1,"y":2}"#);
    let client = common::master_client(&spy);

    let err = client.get_device_location(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    for id in ["short", "x#y"] {
        let err = client.get_device_location(Some(id)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }
    assert_eq!(spy.count(), 0);

    client.get_device_location(Some(OTHER_ID)).await.unwrap();
    assert!(spy.last().url.ends_with(&format!("device/{OTHER_ID}/location")));
}

// ---- Prototype, uncontrol, unenroll ----

#[tokio::test]
async fn enroll_prototype_requires_master() {
    let spy = SpyTransport::replying(201, "{}");
    let params = EnrollPrototype {
        name: "proto".into(),
        ..Default::default()
    };

    let err = common::device_client(&spy)
        .enroll_prototype(&params)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidLogin);
    assert_eq!(spy.count(), 0);

    common::master_client(&spy)
        .enroll_prototype(&params)
        .await
        .unwrap();
    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(common::body_json(&sent), json!({"name": "proto"}));
}

#[tokio::test]
async fn enroll_prototype_rejects_missing_name() {
    let spy = SpyTransport::replying(201, "{}");
    let err = common::master_client(&spy)
        .enroll_prototype(&EnrollPrototype::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
}

#[tokio::test]
async fn uncontrol_device_sends_optional_list() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::master_client(&spy);

    client.uncontrol_device(Some(DEVICE_ID), None).await.unwrap();
    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Delete);
    assert!(sent.url.ends_with(&format!("device/{DEVICE_ID}")));
    assert!(sent.body.is_none());

    let list = json!([OTHER_ID]);
    client
        .uncontrol_device(Some(DEVICE_ID), Some(&list))
        .await
        .unwrap();
    assert_eq!(common::body_json(&spy.last()), list);
}

#[tokio::test]
async fn unenroll_defaults_to_session_device() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    client.unenroll(None).await.unwrap();
    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Delete);
    assert_eq!(sent.url, "http://test.local/iot/device");
    assert_eq!(common::body_json(&sent), json!(DEVICE_ID));

    client.unenroll(Some(&json!([DEVICE_ID, OTHER_ID]))).await.unwrap();
    assert_eq!(common::body_json(&spy.last()), json!([DEVICE_ID, OTHER_ID]));
}

#[tokio::test]
async fn unenroll_csv_is_sent_as_json_string() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    let csv = format!("{DEVICE_ID},{OTHER_ID}");
    client.unenroll(Some(&json!(csv))).await.unwrap();
    assert_eq!(spy.last().body.as_deref(), Some(format!("\"{csv}\"").as_str()));
}

#[tokio::test]
async fn unenroll_with_email_session_needs_explicit_ids() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::master_client(&spy);

    let err = client.unenroll(None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    let err = client.unenroll(Some(&json!(42))).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(spy.count(), 0);
}

// ---- Data ----

#[tokio::test]
async fn publish_data_on_channel() {
    let spy = SpyTransport::replying(200, r#"["5300a1b2c3d4e5f601234567"]"#);
    let client = common::device_client(&spy);

    let entry = DataEntry {
        ttl: Some(60),
        ..DataEntry::new(json!({"temp": 21.5}))
    };
    client.publish_data(&entry, Some("room/1")).await.unwrap();

    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Put);
    assert_eq!(sent.url, "http://test.local/iot/data/room/1");
    assert_eq!(
        common::body_json(&sent),
        json!({"data": {"temp": 21.5}, "ttl": 60})
    );

    client.publish_data(&[entry.clone(), entry], None).await.unwrap();
    let sent = spy.last();
    assert_eq!(sent.url, "http://test.local/iot/data");
    assert_eq!(common::body_json(&sent).as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn publish_data_rejects_blank_payload() {
    let spy = SpyTransport::replying(200, "{}");
    let client = common::device_client(&spy);

    let err = client.publish_data(&json!(null), None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    let err = client.publish_data("", Some("c")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(spy.count(), 0);
}

#[tokio::test]
async fn retrieve_data_builds_query_string() {
    let spy = SpyTransport::replying(200, "[]");
    let client = common::device_client(&spy);

    let query = DataQuery {
        after: Some(json!(1_400_000_000)),
        of: Some(json!([DEVICE_ID, OTHER_ID])),
        limit: Some(10),
        ..DataQuery::new("temp#1")
    };
    client.retrieve_data(&query).await.unwrap();

    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Get);
    assert_eq!(
        sent.url,
        format!(
            "http://test.local/iot/data/temp%231?after=1400000000&limit=10&of={DEVICE_ID}%2C{OTHER_ID}"
        )
    );
}

#[tokio::test]
async fn retrieve_data_validates_paging() {
    let spy = SpyTransport::replying(200, "[]");
    let client = common::device_client(&spy);

    let query = DataQuery {
        offset: Some(-1),
        ..DataQuery::new("temp")
    };
    let err = client.retrieve_data(&query).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);

    let err = client.retrieve_data(&DataQuery::new("")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(spy.count(), 0);
}

#[tokio::test]
async fn remove_data_requires_a_selector() {
    let spy = SpyTransport::replying(200, "1");
    let client = common::device_client(&spy);

    let err = client
        .remove_data(&DataRemoval {
            channel_mask: "temp".into(),
            of: Some(json!(DEVICE_ID)),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert_eq!(spy.count(), 0);

    client
        .remove_data(&DataRemoval {
            channel_mask: "temp".into(),
            id: Some(json!([OBJECT_ID])),
            ..Default::default()
        })
        .await
        .unwrap();
    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Delete);
    assert_eq!(sent.url, "http://test.local/iot/data/temp");
    assert_eq!(common::body_json(&sent), json!({"id": [OBJECT_ID]}));
}

// ---- Channels ----

#[tokio::test]
async fn list_channels_uses_channel_path() {
    let spy = SpyTransport::replying(200, r#"["temp","hum"]"#);
    let client = common::device_client(&spy);

    let response = client
        .list_channels(&DataQuery {
            of: Some(json!(MODEL_ID)),
            ..DataQuery::new("+")
        })
        .await
        .unwrap();
    assert_eq!(response.json::<Vec<String>>().unwrap(), vec!["temp", "hum"]);

    let sent = spy.last();
    assert_eq!(sent.method, HttpMethod::Get);
    assert_eq!(sent.url, format!("http://test.local/iot/channel/+?of={MODEL_ID}"));
}
