//! JSON shapes exchanged with the signing API.
//!
//! Draft save and submit send the same body:
//!
//! ```json
//! {
//!   "textFields": [{"pageNumber": 1, "x": 10, "y": 20, "width": 200, "height": 30,
//!                   "fontSize": 14, "textContent": "Ada"}],
//!   "signatures": [{"pageNumber": 1, "x": 40, "y": 80, "width": 200, "height": 100,
//!                   "signatureImagePath": "signatures/abc.png"}]
//! }
//! ```
//!
//! Draft reads may also carry an `id` per record; ids are never sent.

use serde::{Deserialize, Deserializer, Serialize};

use signkit_editor::{Annotation, AnnotationId, Rect, Signature, TextField};

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}

fn record_id(id: Option<String>) -> AnnotationId {
    match id {
        Some(id) if !id.is_empty() => AnnotationId::Persisted(id),
        _ => AnnotationId::new_local(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextFieldRecord {
    #[serde(default, skip_serializing, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font_size: f64,
    #[serde(default)]
    pub text_content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    #[serde(default, skip_serializing, deserialize_with = "deserialize_id")]
    pub id: Option<String>,
    pub page_number: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub signature_image_path: String,
}

/// Full annotation snapshot for one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    #[serde(default)]
    pub text_fields: Vec<TextFieldRecord>,
    #[serde(default)]
    pub signatures: Vec<SignatureRecord>,
}

impl DraftPayload {
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        let mut payload = DraftPayload::default();
        for annotation in annotations {
            match annotation {
                Annotation::TextField(field) => payload.text_fields.push(TextFieldRecord {
                    id: None,
                    page_number: field.page_number,
                    x: field.rect.x,
                    y: field.rect.y,
                    width: field.rect.width,
                    height: field.rect.height,
                    font_size: field.font_size,
                    text_content: field.text_content.clone(),
                }),
                Annotation::Signature(signature) => payload.signatures.push(SignatureRecord {
                    id: None,
                    page_number: signature.page_number,
                    x: signature.rect.x,
                    y: signature.rect.y,
                    width: signature.rect.width,
                    height: signature.rect.height,
                    signature_image_path: signature.signature_image_path.clone(),
                }),
            }
        }
        payload
    }

    /// Text fields first, then signatures, without previews.
    pub fn into_annotations(self) -> Vec<Annotation> {
        let text_fields = self
            .text_fields
            .into_iter()
            .map(|record| Annotation::from(TextField::from(record)));
        let signatures = self
            .signatures
            .into_iter()
            .map(|record| Annotation::from(Signature::from(record)));
        text_fields.chain(signatures).collect()
    }

    pub fn len(&self) -> usize {
        self.text_fields.len() + self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<TextFieldRecord> for TextField {
    fn from(record: TextFieldRecord) -> Self {
        TextField {
            id: record_id(record.id),
            page_number: record.page_number,
            rect: Rect::new(record.x, record.y, record.width, record.height),
            font_size: record.font_size,
            text_content: record.text_content,
        }
    }
}

impl From<SignatureRecord> for Signature {
    fn from(record: SignatureRecord) -> Self {
        let rect = Rect::new(record.x, record.y, record.width, record.height);
        Signature {
            id: record_id(record.id),
            page_number: record.page_number,
            aspect_ratio: rect.size().aspect_ratio(),
            rect,
            signature_image_path: record.signature_image_path,
            image: None,
        }
    }
}

/// Body returned by the signature upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(alias = "signaturePath")]
    pub signature_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let field = TextField::new(1, Rect::new(10.0, 20.0, 200.0, 30.0), 14.0, "Ada".to_string());
        let signature = Signature::new(
            2,
            Rect::new(40.0, 80.0, 200.0, 100.0),
            "signatures/abc.png".to_string(),
            2.0,
        );
        let payload = DraftPayload::from_annotations(&[field.into(), signature.into()]);
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["textFields"][0]["pageNumber"], 1);
        assert_eq!(json["textFields"][0]["fontSize"], 14.0);
        assert_eq!(json["textFields"][0]["textContent"], "Ada");
        assert!(json["textFields"][0].get("id").is_none());
        assert_eq!(
            json["signatures"][0]["signatureImagePath"],
            "signatures/abc.png"
        );
        assert!(json["signatures"][0].get("imageUrl").is_none());
    }

    #[test]
    fn test_read_with_ids() {
        let payload: DraftPayload = serde_json::from_str(
            r#"{
                "textFields": [{"id": 7, "pageNumber": 1, "x": 1, "y": 2, "width": 200,
                                "height": 30, "fontSize": 14, "textContent": ""}],
                "signatures": [{"id": "s-1", "pageNumber": 3, "x": 0, "y": 0, "width": 150,
                                "height": 50, "signatureImagePath": "signatures/x.png"}]
            }"#,
        )
        .unwrap();

        let field = TextField::from(payload.text_fields[0].clone());
        assert_eq!(field.id, AnnotationId::Persisted("7".to_string()));

        let signature = Signature::from(payload.signatures[0].clone());
        assert_eq!(signature.id, AnnotationId::Persisted("s-1".to_string()));
        assert!((signature.aspect_ratio - 3.0).abs() < 0.01);
    }

    #[test]
    fn test_missing_lists_default_empty() {
        let payload: DraftPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_upload_response() {
        let response: UploadResponse =
            serde_json::from_str(r#"{"signature_path": "signatures/a.png"}"#).unwrap();
        assert_eq!(response.signature_path, "signatures/a.png");
    }
}
