use serde::Serialize;
use ts_rs::TS;
use utoipa::ToSchema;

/// A consulting offering shown to partner companies.
#[derive(Debug, Clone, Serialize, TS, ToSchema)]
#[ts(export)]
pub struct ConsultingService {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub features: Vec<String>,
}

// slug, title, description, features
type ServiceEntry = (&'static str, &'static str, &'static str, [&'static str; 3]);

const SERVICES: [ServiceEntry; 4] = [
    (
        "inclusao",
        "Consultoria em Inclusão",
        "Ajudamos sua empresa a criar um ambiente verdadeiramente inclusivo para pessoas com deficiência.",
        [
            "Diagnóstico organizacional",
            "Plano de ação personalizado",
            "Treinamento de equipes",
        ],
    ),
    (
        "lei-de-cotas",
        "Compliance e Lei de Cotas",
        "Garantimos que sua empresa esteja em conformidade com a legislação vigente.",
        [
            "Auditoria de cumprimento",
            "Estratégias de contratação",
            "Acompanhamento legal",
        ],
    ),
    (
        "acessibilidade-digital",
        "Acessibilidade Digital",
        "Tornamos seus sistemas e plataformas acessíveis para todos os usuários.",
        [
            "Avaliação de acessibilidade",
            "Implementação WCAG",
            "Testes com usuários",
        ],
    ),
    (
        "treinamentos",
        "Treinamentos Corporativos",
        "Capacitamos suas equipes para trabalhar de forma inclusiva e respeitosa.",
        ["Workshops presenciais", "Cursos online", "Materiais educativos"],
    ),
];

/// The fixed consulting catalog.
pub fn consulting_services() -> Vec<ConsultingService> {
    SERVICES
        .iter()
        .map(|(slug, title, description, features)| ConsultingService {
            slug: slug.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_slugs_are_unique() {
        let services = consulting_services();
        let mut slugs: Vec<_> = services.iter().map(|s| s.slug.as_str()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), services.len());
    }
}
