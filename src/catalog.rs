//! Projection catalog for the five Destino Expertos resources
//!
//! These specs encode what the table screens actually show: which foreign
//! keys get denormalized into names, which raw fields get formatted, and
//! which fields the free-text search box looks at. Field alias lists cover
//! every spelling observed on the wire.

use crate::entity::Resource;
use crate::project::{
    Fallback, FieldRef, FormattedColumn, Formatter, KeySource, ProjectionSpec, ReferenceColumn,
};

// Observed alias spellings per logical foreign key.
const REQUEST_FK: FieldRef = &[
    "solicitud_id",
    "solicitudId",
    "idSolicitud",
    "SolicitudId",
    "requestId",
    "request_id",
];
const CLIENT_FK: FieldRef = &["cliente_id", "clienteId", "ClienteId", "clientId"];
const PROFESSIONAL_FK: FieldRef = &[
    "profesional_id",
    "profesionalId",
    "ProfesionalId",
    "professionalId",
];
const SERVICE_FK: FieldRef = &["servicio_id", "servicioId", "ServicioId", "serviceId"];
const NAME: FieldRef = &["nombre", "Nombre"];
const DESCRIPTION: FieldRef = &["descripcion", "Descripcion"];

pub const RATING_LABELS: [&str; 6] = [
    "",
    "Terrible service",
    "Poor service",
    "Average service",
    "Good service",
    "Excellent service",
];

const STATUS_LABELS: [(&str, &str); 5] = [
    ("pendiente", "Pending"),
    ("confirmada", "Confirmed"),
    ("en_proceso", "In progress"),
    ("completada", "Completed"),
    ("cancelada", "Cancelled"),
];

const URGENCY_LABELS: [(&str, &str); 3] = [("baja", "Low"), ("media", "Medium"), ("alta", "High")];

static CLIENTS: ProjectionSpec = ProjectionSpec {
    resource: Resource::Clients,
    references: &[],
    formatted: &[
        FormattedColumn {
            name: "location",
            source: &["ubicacion"],
            format: Formatter::TextOr {
                empty: "Not specified",
            },
        },
        FormattedColumn {
            name: "preferences",
            source: &["preferencias"],
            format: Formatter::JoinList {
                empty: "None specified",
            },
        },
        FormattedColumn {
            name: "notifications",
            source: &["notificaciones"],
            format: Formatter::YesNo,
        },
    ],
    search_fields: &["nombre", "email", "ubicacion"],
};

static PROFESSIONALS: ProjectionSpec = ProjectionSpec {
    resource: Resource::Professionals,
    references: &[],
    formatted: &[
        FormattedColumn {
            name: "location",
            source: &["ubicacion"],
            format: Formatter::TextOr {
                empty: "Not specified",
            },
        },
        FormattedColumn {
            name: "trades",
            source: &["oficios"],
            format: Formatter::JoinList {
                empty: "None specified",
            },
        },
        FormattedColumn {
            name: "experience",
            source: &["experiencia"],
            format: Formatter::Unit { suffix: "years" },
        },
        FormattedColumn {
            name: "available",
            source: &["disponibilidad"],
            format: Formatter::YesNo,
        },
    ],
    search_fields: &["nombre", "especialidad", "email"],
};

static SERVICES: ProjectionSpec = ProjectionSpec {
    resource: Resource::Services,
    references: &[ReferenceColumn {
        name: "professionalName",
        source: KeySource::Own(PROFESSIONAL_FK),
        target: Resource::Professionals,
        label: NAME,
        hop_label: None,
        fallback: Fallback::Label("Unassigned professional"),
    }],
    formatted: &[
        FormattedColumn {
            name: "price",
            source: &["precioBase", "precio_base"],
            format: Formatter::Currency { symbol: "$" },
        },
        FormattedColumn {
            name: "duration",
            source: &["duracionEstimada", "duracion_estimada"],
            format: Formatter::Unit { suffix: "min" },
        },
        FormattedColumn {
            name: "active",
            source: &["activo"],
            format: Formatter::YesNo,
        },
    ],
    search_fields: &["nombre", "categoria", "descripcion"],
};

static REQUESTS: ProjectionSpec = ProjectionSpec {
    resource: Resource::Requests,
    references: &[
        ReferenceColumn {
            name: "clientName",
            source: KeySource::Own(CLIENT_FK),
            target: Resource::Clients,
            label: NAME,
            hop_label: None,
            fallback: Fallback::WithKey("Client"),
        },
        ReferenceColumn {
            name: "professionalName",
            source: KeySource::Own(PROFESSIONAL_FK),
            target: Resource::Professionals,
            label: NAME,
            hop_label: None,
            fallback: Fallback::WithKey("Professional"),
        },
        ReferenceColumn {
            name: "serviceName",
            source: KeySource::Own(SERVICE_FK),
            target: Resource::Services,
            label: NAME,
            hop_label: None,
            fallback: Fallback::WithKey("Service"),
        },
    ],
    formatted: &[
        FormattedColumn {
            name: "status",
            source: &["estado"],
            format: Formatter::EnumLabel {
                labels: &STATUS_LABELS,
                unknown: "Unknown",
            },
        },
        FormattedColumn {
            name: "urgent",
            source: &["urgencia"],
            format: Formatter::YesNo,
        },
        FormattedColumn {
            name: "urgencyLevel",
            source: &["nivelUrgencia", "nivel_urgencia"],
            format: Formatter::EnumLabel {
                labels: &URGENCY_LABELS,
                unknown: "-",
            },
        },
        FormattedColumn {
            name: "date",
            source: &["fecha"],
            format: Formatter::DateDisplay { missing: "No date" },
        },
        FormattedColumn {
            name: "location",
            source: &["ubicacion"],
            format: Formatter::TextOr {
                empty: "Not specified",
            },
        },
    ],
    search_fields: &["descripcion", "ubicacion", "estado"],
};

static REVIEWS: ProjectionSpec = ProjectionSpec {
    resource: Resource::Reviews,
    references: &[
        ReferenceColumn {
            name: "requestDescription",
            source: KeySource::Own(REQUEST_FK),
            target: Resource::Requests,
            label: DESCRIPTION,
            hop_label: None,
            fallback: Fallback::Label("N/A"),
        },
        ReferenceColumn {
            name: "clientName",
            source: KeySource::ViaThenOwn {
                via: REQUEST_FK,
                via_target: Resource::Requests,
                field: CLIENT_FK,
                own: CLIENT_FK,
            },
            target: Resource::Clients,
            label: NAME,
            hop_label: None,
            fallback: Fallback::Label("Unknown client"),
        },
        ReferenceColumn {
            name: "professionalName",
            source: KeySource::ViaThenOwn {
                via: REQUEST_FK,
                via_target: Resource::Requests,
                field: PROFESSIONAL_FK,
                own: PROFESSIONAL_FK,
            },
            target: Resource::Professionals,
            label: NAME,
            hop_label: None,
            fallback: Fallback::Label("Unassigned professional"),
        },
        ReferenceColumn {
            name: "serviceName",
            source: KeySource::ViaThenOwn {
                via: REQUEST_FK,
                via_target: Resource::Requests,
                field: SERVICE_FK,
                own: SERVICE_FK,
            },
            target: Resource::Services,
            label: NAME,
            // The review screen shows the request description when the
            // service record itself is missing.
            hop_label: Some(DESCRIPTION),
            fallback: Fallback::Label("General service"),
        },
    ],
    formatted: &[
        FormattedColumn {
            name: "rating",
            source: &["calificacion", "rating"],
            format: Formatter::Rating {
                labels: &RATING_LABELS,
            },
        },
        FormattedColumn {
            name: "anonymous",
            source: &["anonima"],
            format: Formatter::YesNo,
        },
        FormattedColumn {
            name: "date",
            source: &["fecha"],
            format: Formatter::DateDisplay { missing: "No date" },
        },
    ],
    search_fields: &[
        "comentario",
        "calificacion",
        "solicitud_id",
        "clientName",
        "professionalName",
    ],
};

/// The projection recipe for a resource's table screen.
pub fn spec_for(resource: Resource) -> &'static ProjectionSpec {
    match resource {
        Resource::Clients => &CLIENTS,
        Resource::Professionals => &PROFESSIONALS,
        Resource::Services => &SERVICES,
        Resource::Requests => &REQUESTS,
        Resource::Reviews => &REVIEWS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_resource_has_a_spec() {
        for resource in Resource::ALL {
            let spec = spec_for(resource);
            assert_eq!(spec.resource, resource);
            assert!(!spec.search_fields.is_empty());
        }
    }

    #[test]
    fn review_spec_denormalizes_the_full_chain() {
        let names: Vec<_> = spec_for(Resource::Reviews)
            .references
            .iter()
            .map(|r| r.name)
            .collect();
        assert!(names.contains(&"clientName"));
        assert!(names.contains(&"professionalName"));
        assert!(names.contains(&"serviceName"));
        assert!(names.contains(&"requestDescription"));
    }
}
