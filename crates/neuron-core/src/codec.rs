//! JSON:API document codec
//!
//! Encodes scope values into `{"data": ...}` documents and decodes server
//! documents back into them. A model's primary field travels as the resource
//! `id`; every other field travels inside `attributes`.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CodecError, CodecResult};
use crate::model::{Controller, Model};
use crate::scope::ScopeValue;

/// JSON:API media type
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// A JSON:API resource object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// Primary data of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Many(Vec<Resource>),
    One(Box<Resource>),
}

/// A JSON:API top-level document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub data: Option<PrimaryData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl Resource {
    /// Build a resource object from a model
    pub fn from_model<M: Model>(model: &M) -> CodecResult<Self> {
        let Value::Object(mut attributes) = serde_json::to_value(model)? else {
            return Err(CodecError::NotAnObject(M::COLLECTION));
        };

        let id = match attributes.remove(M::PRIMARY_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        Ok(Self {
            resource_type: M::COLLECTION.to_string(),
            id,
            attributes,
        })
    }

    /// Rebuild a model from this resource object
    pub fn into_model<M: Model>(self) -> CodecResult<M> {
        if self.resource_type != M::COLLECTION {
            return Err(CodecError::TypeMismatch {
                expected: M::COLLECTION,
                actual: self.resource_type,
            });
        }

        let mut object = self.attributes;
        if let Some(id) = self.id {
            object.insert(M::PRIMARY_FIELD.to_string(), Value::String(id));
        }
        Ok(serde_json::from_value(Value::Object(object))?)
    }
}

impl Document {
    fn resource_types(&self) -> Vec<&str> {
        match &self.data {
            Some(PrimaryData::One(r)) => vec![r.resource_type.as_str()],
            Some(PrimaryData::Many(rs)) => rs.iter().map(|r| r.resource_type.as_str()).collect(),
            None => Vec::new(),
        }
    }

    fn into_value<M: Model>(self) -> CodecResult<ScopeValue<M>> {
        match self.data {
            None => Ok(ScopeValue::Empty),
            Some(PrimaryData::One(resource)) => Ok(ScopeValue::One(resource.into_model()?)),
            Some(PrimaryData::Many(resources)) => Ok(ScopeValue::Many(
                resources
                    .into_iter()
                    .map(Resource::into_model)
                    .collect::<CodecResult<_>>()?,
            )),
        }
    }
}

impl Controller {
    /// Write `value` as a JSON:API document
    pub fn encode<W: Write, M: Model>(&self, writer: W, value: &ScopeValue<M>) -> CodecResult<()> {
        let data = match value {
            ScopeValue::Empty => return Err(CodecError::NoValue),
            ScopeValue::One(model) => PrimaryData::One(Box::new(Resource::from_model(model)?)),
            ScopeValue::Many(models) => PrimaryData::Many(
                models
                    .iter()
                    .map(Resource::from_model)
                    .collect::<CodecResult<_>>()?,
            ),
        };

        let document = Document {
            data: Some(data),
            meta: None,
        };
        serde_json::to_writer(writer, &document)?;
        Ok(())
    }

    /// Read a JSON:API document into `value`, resolving the type from `M`
    pub fn decode<R: Read, M: Model>(
        &self,
        reader: R,
        value: &mut ScopeValue<M>,
    ) -> CodecResult<()> {
        let document: Document = serde_json::from_reader(reader)?;
        *value = document.into_value()?;
        Ok(())
    }

    /// Read a JSON:API document into `value`, resolving the type from the registry
    ///
    /// Every resource type in the document must be registered, and must be `M`.
    pub fn decode_registered<R: Read, M: Model>(
        &self,
        reader: R,
        value: &mut ScopeValue<M>,
    ) -> CodecResult<()> {
        let document: Document = serde_json::from_reader(reader)?;

        for resource_type in document.resource_types() {
            let Some(ms) = self.registry().get(resource_type) else {
                return Err(CodecError::UnregisteredType(resource_type.to_string()));
            };
            if ms.collection() != M::COLLECTION || !self.is_registered::<M>() {
                return Err(CodecError::TypeMismatch {
                    expected: M::COLLECTION,
                    actual: resource_type.to_string(),
                });
            }
        }

        *value = document.into_value()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Article {
        #[serde(default)]
        id: String,
        title: String,
        #[serde(default)]
        views: u32,
    }

    impl Model for Article {
        const COLLECTION: &'static str = "articles";
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Comment {
        id: String,
        body: String,
    }

    impl Model for Comment {
        const COLLECTION: &'static str = "comments";
    }

    fn controller() -> Controller {
        Controller::builder().register::<Article>().build()
    }

    #[test]
    fn test_encode_single() {
        let article = Article {
            id: "7".into(),
            title: "Hello".into(),
            views: 3,
        };
        let mut buf = Vec::new();
        controller()
            .encode(&mut buf, &ScopeValue::One(article))
            .unwrap();

        let doc: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(
            doc,
            json!({"data": {"type": "articles", "id": "7", "attributes": {"title": "Hello", "views": 3}}})
        );
    }

    #[test]
    fn test_encode_omits_empty_id() {
        let article = Article {
            id: String::new(),
            title: "New".into(),
            views: 0,
        };
        let resource = Resource::from_model(&article).unwrap();
        assert_eq!(resource.id, None);
    }

    #[test]
    fn test_encode_empty_value_fails() {
        let result = controller().encode(Vec::new(), &ScopeValue::<Article>::Empty);
        assert!(matches!(result, Err(CodecError::NoValue)));
    }

    #[test]
    fn test_decode_many() {
        let body = r#"{"data":[
            {"type":"articles","id":"1","attributes":{"title":"a"}},
            {"type":"articles","id":"2","attributes":{"title":"b","views":9}}
        ]}"#;
        let mut value = ScopeValue::<Article>::Empty;
        controller().decode(body.as_bytes(), &mut value).unwrap();

        let many = value.into_many().unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].id, "2");
        assert_eq!(many[1].views, 9);
    }

    #[test]
    fn test_decode_null_data() {
        let mut value = ScopeValue::One(Article {
            id: "1".into(),
            title: "x".into(),
            views: 0,
        });
        controller()
            .decode(r#"{"data":null}"#.as_bytes(), &mut value)
            .unwrap();
        assert!(value.is_empty());
    }

    #[test]
    fn test_decode_type_mismatch() {
        let body = r#"{"data":{"type":"comments","id":"1","attributes":{"title":"a"}}}"#;
        let mut value = ScopeValue::<Article>::Empty;
        let err = controller().decode(body.as_bytes(), &mut value).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }

    #[test]
    fn test_decode_malformed() {
        let mut value = ScopeValue::<Article>::Empty;
        let err = controller().decode("not json".as_bytes(), &mut value).unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }

    #[test]
    fn test_decode_registered_rejects_unknown_type() {
        let body = r#"{"data":{"type":"comments","id":"1","attributes":{"body":"hi"}}}"#;
        let mut value = ScopeValue::<Comment>::Empty;
        let err = controller()
            .decode_registered(body.as_bytes(), &mut value)
            .unwrap_err();
        assert!(matches!(err, CodecError::UnregisteredType(t) if t == "comments"));
    }

    #[test]
    fn test_decode_registered() {
        let body = r#"{"data":{"type":"articles","id":"5","attributes":{"title":"t"}}}"#;
        let mut value = ScopeValue::<Article>::Empty;
        controller()
            .decode_registered(body.as_bytes(), &mut value)
            .unwrap();
        assert_eq!(value.into_one().unwrap().id, "5");
    }

    #[test]
    fn test_roundtrip_preserves_value() {
        let article = Article {
            id: "42".into(),
            title: "Round".into(),
            views: 12,
        };
        let ctrl = controller();
        let mut buf = Vec::new();
        ctrl.encode(&mut buf, &ScopeValue::One(article.clone())).unwrap();

        let mut value = ScopeValue::Empty;
        ctrl.decode_registered(buf.as_slice(), &mut value).unwrap();
        assert_eq!(value, ScopeValue::One(article));
    }
}
