use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct HeaderDoc { pub name: String, pub value: String }

/// Wire shape of a sample query; unknown fields are kept and echoed back.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SampleQueryDoc {
    pub id: Option<Uuid>,
    pub category: String,
    pub method: String,
    pub human_name: String,
    pub request_url: String,
    pub doc_link: Option<String>,
    pub headers: Option<Vec<HeaderDoc>>,
    pub body: Option<String>,
    pub tip: Option<String>,
    pub skip_test: Option<bool>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SampleQueriesListDoc {
    pub sample_queries: Vec<SampleQueryDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::samples::list_samples,
        crate::routes::samples::get_sample,
        crate::routes::samples::update_sample,
        crate::routes::samples::create_sample,
        crate::routes::samples::delete_sample,
    ),
    components(
        schemas(
            HealthResponse,
            HeaderDoc,
            SampleQueryDoc,
            SampleQueriesListDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "samples")
    )
)]
pub struct ApiDoc;
