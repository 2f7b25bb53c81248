use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use super::quiz::{
    same_quiz_id, AnswerOption, CopyRule, QuestionDefinition, QuizDefinition, QuizDefinitionError,
    QuizKind, ADVANCED_QUIZ_ID, INITIAL_QUIZ_ID,
};

static INITIAL_QUIZ: OnceLock<QuizDefinition> = OnceLock::new();
static ADVANCED_QUIZ: OnceLock<QuizDefinition> = OnceLock::new();

const INITIAL_OPTIONS: &[(&str, i32)] = &[
    ("No implementado", 0),
    ("En planificación", 1),
    ("Parcialmente implementado", 2),
    ("Implementado y revisado", 3),
];

const ADVANCED_OPTIONS: &[(&str, i32)] = &[
    ("Inexistente", 0),
    ("Ad hoc", 1),
    ("Documentado y aplicado", 2),
    ("Medido y mejorado continuamente", 3),
];

/// The fifteen-question intake questionnaire.
pub fn initial_quiz() -> &'static QuizDefinition {
    INITIAL_QUIZ.get_or_init(|| {
        const QUESTIONS: &[(&str, &str, &str)] = &[
            // Políticas de Seguridad
            (
                "politicas-1",
                "Políticas de Seguridad",
                "¿La organización cuenta con una política de seguridad de la información aprobada por la dirección?",
            ),
            (
                "politicas-2",
                "Políticas de Seguridad",
                "¿Las políticas de seguridad se comunican a todo el personal?",
            ),
            (
                "politicas-3",
                "Políticas de Seguridad",
                "¿Las políticas se revisan al menos una vez al año?",
            ),
            // Gestión de Accesos
            (
                "accesos-1",
                "Gestión de Accesos",
                "¿Se exigen contraseñas robustas y únicas para cada servicio?",
            ),
            (
                "accesos-2",
                "Gestión de Accesos",
                "¿Está habilitada la autenticación multifactor en los sistemas críticos?",
            ),
            (
                "accesos-3",
                "Gestión de Accesos",
                "¿Se revocan los accesos cuando una persona deja la organización?",
            ),
            // Protección de Datos
            (
                "datos-1",
                "Protección de Datos",
                "¿Se realizan copias de seguridad periódicas de la información crítica?",
            ),
            (
                "datos-2",
                "Protección de Datos",
                "¿Se comprueba regularmente que las copias de seguridad pueden restaurarse?",
            ),
            (
                "datos-3",
                "Protección de Datos",
                "¿La información sensible se almacena cifrada?",
            ),
            // Respuesta a Incidentes
            (
                "incidentes-1",
                "Respuesta a Incidentes",
                "¿Existe un procedimiento documentado de respuesta a incidentes?",
            ),
            (
                "incidentes-2",
                "Respuesta a Incidentes",
                "¿El personal sabe a quién reportar un incidente de seguridad?",
            ),
            (
                "incidentes-3",
                "Respuesta a Incidentes",
                "¿Se analizan los incidentes para evitar que se repitan?",
            ),
            // Indicadores y Monitoreo
            (
                "indicadores-1",
                "Indicadores y Monitoreo",
                "¿Se monitorean los registros de actividad de los sistemas?",
            ),
            (
                "indicadores-2",
                "Indicadores y Monitoreo",
                "¿Se miden indicadores de seguridad de forma periódica?",
            ),
            (
                "indicadores-3",
                "Indicadores y Monitoreo",
                "¿Los indicadores de seguridad se reportan a la dirección?",
            ),
        ];

        let mut quiz = build_quiz(
            INITIAL_QUIZ_ID,
            QuizKind::Initial,
            "Evaluación inicial de madurez en ciberseguridad",
            QUESTIONS,
            INITIAL_OPTIONS,
        );
        // Records saved before indicadores-3 was persisted only carry indicadores-2.
        quiz.copy_rules.push(CopyRule {
            target: "indicadores-3".to_string(),
            source: "indicadores-2".to_string(),
        });
        quiz
    })
}

/// The twenty-four-question follow-up questionnaire, scored as a percentage.
pub fn advanced_quiz() -> &'static QuizDefinition {
    ADVANCED_QUIZ.get_or_init(|| {
        const QUESTIONS: &[(&str, &str, &str)] = &[
            // Gobierno de Seguridad
            (
                "gobierno-1",
                "Gobierno de Seguridad",
                "¿Existe un responsable de seguridad de la información con autoridad formal?",
            ),
            (
                "gobierno-2",
                "Gobierno de Seguridad",
                "¿La dirección revisa el estado de la seguridad en sus reuniones periódicas?",
            ),
            (
                "gobierno-3",
                "Gobierno de Seguridad",
                "¿Existe un presupuesto asignado a la seguridad de la información?",
            ),
            (
                "gobierno-4",
                "Gobierno de Seguridad",
                "¿Los roles y responsabilidades de seguridad están documentados?",
            ),
            // Gestión de Riesgos
            (
                "riesgos-1",
                "Gestión de Riesgos",
                "¿Se mantiene un inventario actualizado de activos de información?",
            ),
            (
                "riesgos-2",
                "Gestión de Riesgos",
                "¿Se realiza un análisis de riesgos al menos una vez al año?",
            ),
            (
                "riesgos-3",
                "Gestión de Riesgos",
                "¿Los riesgos identificados tienen un plan de tratamiento con responsables?",
            ),
            (
                "riesgos-4",
                "Gestión de Riesgos",
                "¿Se evalúa la seguridad de los proveedores que acceden a sus datos?",
            ),
            // Seguridad de la Red
            (
                "red-1",
                "Seguridad de la Red",
                "¿La red está segmentada según la criticidad de los sistemas?",
            ),
            (
                "red-2",
                "Seguridad de la Red",
                "¿Se aplican parches de seguridad en un plazo definido?",
            ),
            (
                "red-3",
                "Seguridad de la Red",
                "¿Se realizan análisis de vulnerabilidades o pruebas de penetración?",
            ),
            (
                "red-4",
                "Seguridad de la Red",
                "¿El acceso remoto se realiza mediante canales cifrados y autenticados?",
            ),
            // Continuidad del Negocio
            (
                "continuidad-1",
                "Continuidad del Negocio",
                "¿Existe un plan de continuidad del negocio documentado?",
            ),
            (
                "continuidad-2",
                "Continuidad del Negocio",
                "¿Se han definido tiempos objetivo de recuperación para los servicios críticos?",
            ),
            (
                "continuidad-3",
                "Continuidad del Negocio",
                "¿El plan de continuidad se prueba al menos una vez al año?",
            ),
            (
                "continuidad-4",
                "Continuidad del Negocio",
                "¿Las copias de seguridad se almacenan fuera de la red principal?",
            ),
            // Concienciación y Formación
            (
                "formacion-1",
                "Concienciación y Formación",
                "¿El personal recibe formación en seguridad al incorporarse?",
            ),
            (
                "formacion-2",
                "Concienciación y Formación",
                "¿Se realizan campañas periódicas de concienciación?",
            ),
            (
                "formacion-3",
                "Concienciación y Formación",
                "¿Se realizan simulaciones de phishing?",
            ),
            (
                "formacion-4",
                "Concienciación y Formación",
                "¿Se mide la efectividad de las acciones de formación?",
            ),
            // Cumplimiento Normativo
            (
                "cumplimiento-1",
                "Cumplimiento Normativo",
                "¿Se identifican las obligaciones legales de protección de datos aplicables?",
            ),
            (
                "cumplimiento-2",
                "Cumplimiento Normativo",
                "¿Se realizan auditorías internas de seguridad?",
            ),
            (
                "cumplimiento-3",
                "Cumplimiento Normativo",
                "¿Los contratos con terceros incluyen cláusulas de seguridad?",
            ),
            (
                "cumplimiento-4",
                "Cumplimiento Normativo",
                "¿Se conservan evidencias del cumplimiento de los controles?",
            ),
        ];

        build_quiz(
            ADVANCED_QUIZ_ID,
            QuizKind::Advanced,
            "Evaluación avanzada de madurez en ciberseguridad",
            QUESTIONS,
            ADVANCED_OPTIONS,
        )
    })
}

fn build_quiz(
    id: &str,
    kind: QuizKind,
    title: &str,
    questions: &[(&str, &str, &str)],
    options: &[(&str, i32)],
) -> QuizDefinition {
    let options: Vec<AnswerOption> = options
        .iter()
        .map(|(label, value)| AnswerOption {
            label: (*label).to_string(),
            value: *value,
        })
        .collect();

    QuizDefinition {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        questions: questions
            .iter()
            .map(|(id, category, text)| QuestionDefinition {
                id: (*id).to_string(),
                category: (*category).to_string(),
                text: (*text).to_string(),
                options: options.clone(),
            })
            .collect(),
        copy_rules: Vec::new(),
        legacy_aliases: Default::default(),
    }
}

/// Read-only lookup of questionnaire definitions by id.
#[derive(Debug, Clone)]
pub struct QuizCatalog {
    quizzes: Vec<QuizDefinition>,
}

impl QuizCatalog {
    pub fn standard() -> Self {
        Self {
            quizzes: vec![initial_quiz().clone(), advanced_quiz().clone()],
        }
    }

    pub fn get(&self, quiz_id: &str) -> Option<&QuizDefinition> {
        self.quizzes
            .iter()
            .find(|quiz| same_quiz_id(&quiz.id, quiz_id))
    }

    pub fn quizzes(&self) -> &[QuizDefinition] {
        &self.quizzes
    }

    /// Adds a validated definition, replacing any quiz with the same id.
    pub fn insert(&mut self, quiz: QuizDefinition) -> Result<(), QuizDefinitionError> {
        quiz.validate()?;
        match self.quizzes.iter_mut().find(|existing| same_quiz_id(&existing.id, &quiz.id)) {
            Some(existing) => *existing = quiz,
            None => self.quizzes.push(quiz),
        }
        Ok(())
    }

    /// Merges a JSON array of quiz definitions, returning how many were loaded.
    pub fn extend_from_reader<R: Read>(&mut self, reader: R) -> Result<usize, QuizDefinitionError> {
        let quizzes: Vec<QuizDefinition> = serde_json::from_reader(reader)?;
        let count = quizzes.len();
        for quiz in quizzes {
            tracing::debug!(quiz_id = %quiz.id, questions = quiz.questions.len(), "loaded quiz definition");
            self.insert(quiz)?;
        }
        Ok(count)
    }

    pub fn extend_from_path<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, QuizDefinitionError> {
        let file = std::fs::File::open(path)?;
        self.extend_from_reader(std::io::BufReader::new(file))
    }
}

impl Default for QuizCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
