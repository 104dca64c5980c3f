//! FlatBuffers framing of upload batches

use bytes::Bytes;
use flatbuffers::{root, FlatBufferBuilder};
use log::error;

use crate::error::IngestError;
use crate::service::ingestion::IngestItem;
use crate::util::flatbuffer_store_generated::store::{FileData, FileDataArgs, FileDataList, FileDataListArgs};

/// Decode an upload body into batch items. A file without a media type
/// gets an empty one so the type gate rejects it.
pub fn decode_upload(body: &[u8]) -> Result<Vec<IngestItem>, IngestError> {
    let file_data_list = root::<FileDataList>(body).map_err(|e| {
        error!("Failed to parse FlatBuffers data: {:?}", e);
        IngestError::InvalidPayload(format!("failed to parse FlatBuffers data: {}", e))
    })?;

    let files = match file_data_list.files() {
        Some(files) => files,
        None => return Err(IngestError::EmptyBatch),
    };

    files
        .iter()
        .enumerate()
        .map(|(index, file_data)| {
            let data = file_data.data().ok_or_else(|| {
                error!("No data in file at index {}", index);
                IngestError::InvalidPayload(format!("file {} has no data", index))
            })?;
            Ok(IngestItem {
                bytes: Bytes::copy_from_slice(data.bytes()),
                media_type: file_data.media_type().unwrap_or_default().to_string(),
            })
        })
        .collect()
}

/// Encode `(data, media_type)` pairs as an upload body
pub fn encode_upload<D: AsRef<[u8]>>(files: &[(D, &str)]) -> Vec<u8> {
    let mut builder = FlatBufferBuilder::new();
    let mut file_data_vec = Vec::with_capacity(files.len());

    for (data, media_type) in files {
        let data_vector = builder.create_vector(data.as_ref());
        let media_type = builder.create_string(media_type);
        let file_data = FileData::create(
            &mut builder,
            &FileDataArgs {
                data: Some(data_vector),
                media_type: Some(media_type),
            },
        );
        file_data_vec.push(file_data);
    }

    let files = builder.create_vector(&file_data_vec);
    let file_data_list = FileDataList::create(&mut builder, &FileDataListArgs { files: Some(files) });
    builder.finish(file_data_list, None);
    builder.finished_data().to_vec()
}
