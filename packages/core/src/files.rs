//! Image uploads, relationships and annotation suggestions.

use crate::decode::{Detection, ImageMessage};
use crate::error::{PipelineError, PipelineResult};
use crate::events::resolve_assets;
use fieldline_client::{AnnotationSuggestion, BoundingBox, FileUpload, Platform, Relationship};

const IMAGE_MIME: &str = "image/jpeg";

/// Fixed label table for detection class ids; the index is the class
/// id reported by the edge model.
pub const ANNOTATION_LABELS: &[&str] = &[
    "corrosion",
    "leak",
    "smoke",
    "flame",
    "intruder",
    "missing-guard",
];

/// Translate a class id through the label table.
pub fn label_for(class_id: i64) -> PipelineResult<&'static str> {
    usize::try_from(class_id)
        .ok()
        .and_then(|index| ANNOTATION_LABELS.get(index))
        .copied()
        .ok_or(PipelineError::UnknownAnnotationLabel(class_id))
}

/// Upload image evidence for an anomaly event.
///
/// A file that already exists downstream short-circuits the whole
/// handler: uploads are not idempotent overwrites, and the
/// relationship and annotations were written the first time around.
pub async fn handle_image(platform: &dyn Platform, message: &ImageMessage) -> PipelineResult<()> {
    let asset_ids = resolve_assets(platform, &message.event.asset_external_ids).await?;

    if platform.retrieve_file(&message.file_name).await?.is_some() {
        tracing::warn!(file = %message.file_name, "File already uploaded, skipping");
        return Ok(());
    }

    let upload = FileUpload {
        external_id: message.file_name.clone(),
        name: message.file_name.clone(),
        mime_type: IMAGE_MIME.to_string(),
        asset_ids,
        data_set_id: None,
    };
    let file = platform
        .upload_file(&upload, message.content.clone())
        .await?;
    tracing::info!(file = %file.external_id, id = file.id, "Uploaded image evidence");

    platform
        .create_relationship(&Relationship::event_to_file(
            &message.event.external_id,
            &file.external_id,
        ))
        .await?;

    let suggestions = build_suggestions(file.id, &message.detections);
    if !suggestions.is_empty() {
        platform.suggest_annotations(&suggestions).await?;
    }

    Ok(())
}

/// One suggestion per detection; a class id outside the label table
/// drops that detection only.
fn build_suggestions(file_id: i64, detections: &[Detection]) -> Vec<AnnotationSuggestion> {
    detections
        .iter()
        .filter_map(|detection| match label_for(detection.class_id) {
            Ok(label) => Some(AnnotationSuggestion::for_file(
                file_id,
                label,
                detection.confidence,
                BoundingBox {
                    x_min: detection.x_min,
                    y_min: detection.y_min,
                    x_max: detection.x_max,
                    y_max: detection.y_max,
                },
            )),
            Err(error) => {
                tracing::error!(error = %error, "Skipping annotation");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::AnomalyMessage;
    use crate::testing::MockPlatform;
    use fieldline_types::Bytes;

    fn image_message(detections: Vec<Detection>) -> ImageMessage {
        ImageMessage {
            event: AnomalyMessage {
                external_id: "evt-17".to_string(),
                kind: "anomaly".to_string(),
                subtype: None,
                description: "smoke detected".to_string(),
                start_time: 1647382220000,
                end_time: None,
                asset_external_ids: vec!["cam-1".to_string()],
                datapoints: Vec::new(),
            },
            content: Bytes::from_static(b"jpeg-bytes"),
            file_name: "evt-17.jpg".to_string(),
            detections,
        }
    }

    fn detection(class_id: i64) -> Detection {
        Detection {
            x_min: 0.12,
            y_min: 0.08,
            x_max: 0.45,
            y_max: 0.61,
            confidence: 0.92,
            class_id,
        }
    }

    #[test]
    fn test_label_table_bounds() {
        assert_eq!(label_for(0).unwrap(), "corrosion");
        assert_eq!(label_for(5).unwrap(), "missing-guard");
        assert!(matches!(
            label_for(6),
            Err(PipelineError::UnknownAnnotationLabel(6))
        ));
        assert!(matches!(
            label_for(-1),
            Err(PipelineError::UnknownAnnotationLabel(-1))
        ));
    }

    #[tokio::test]
    async fn test_uploads_links_and_suggests() {
        let platform = MockPlatform::new().with_asset("cam-1", 99);
        let message = image_message(vec![detection(2), detection(41)]);

        handle_image(&platform, &message).await.unwrap();

        let uploads = platform.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0.external_id, "evt-17.jpg");
        assert_eq!(uploads[0].0.mime_type, "image/jpeg");
        assert_eq!(uploads[0].0.asset_ids, vec![99]);
        assert_eq!(uploads[0].1.as_ref(), b"jpeg-bytes");

        let relationships = platform.relationships.lock().unwrap();
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].source_external_id, "evt-17");
        assert_eq!(relationships[0].target_external_id, "evt-17.jpg");

        // The out-of-table detection is dropped, the valid one kept.
        let suggestions = platform.suggestions.lock().unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].label, "smoke");
        assert_eq!(suggestions[0].annotated_resource_id, 7000);
    }

    #[tokio::test]
    async fn test_existing_file_short_circuits_every_write() {
        let platform = MockPlatform::new()
            .with_asset("cam-1", 99)
            .with_file("evt-17.jpg", 7);
        let message = image_message(vec![detection(2)]);

        handle_image(&platform, &message).await.unwrap();

        assert!(platform.uploads.lock().unwrap().is_empty());
        assert!(platform.relationships.lock().unwrap().is_empty());
        assert!(platform.suggestions.lock().unwrap().is_empty());
        // One asset lookup, one file lookup, nothing else.
        assert_eq!(platform.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unresolved_asset_aborts_before_upload() {
        let platform = MockPlatform::new();
        let message = image_message(vec![detection(2)]);

        let error = handle_image(&platform, &message).await.unwrap_err();
        assert!(matches!(
            error,
            PipelineError::UnresolvedAssetReference(id) if id == "cam-1"
        ));
        assert!(platform.uploads.lock().unwrap().is_empty());
        assert_eq!(platform.call_count(), 1);
    }

    #[tokio::test]
    async fn test_no_detections_means_no_suggestion_call() {
        let platform = MockPlatform::new().with_asset("cam-1", 99);
        let message = image_message(Vec::new());

        handle_image(&platform, &message).await.unwrap();

        assert!(platform.suggestions.lock().unwrap().is_empty());
        // asset + file lookup + upload + relationship, no suggest call
        assert_eq!(platform.call_count(), 4);
    }
}
