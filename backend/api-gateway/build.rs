fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The gateway only calls backend services
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        // Response messages are returned to HTTP clients as JSON
        .type_attribute(".", "#[derive(serde::Serialize)]")
        // Profiles of other users are returned without an email
        .field_attribute(
            ".eventhub.user_service.v1.UserProfile.email",
            "#[serde(skip_serializing_if = \"String::is_empty\")]",
        )
        .compile_protos(
            &[
                "../proto/services/auth_service.proto",
                "../proto/services/user_service.proto",
                "../proto/services/event_service.proto",
                "../proto/services/image_service.proto",
                "../proto/services/csat_service.proto",
            ],
            &["../proto/services"],
        )?;
    Ok(())
}
