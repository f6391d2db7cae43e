//! Static per-country legal-framework blocks for prompt assembly.
//!
//! Each block summarizes the procurement law a model needs to ground its
//! analysis: the governing statute, the supervising body, the public portal,
//! registration and guarantee requirements. Lookup is by country name,
//! tolerant of casing and accents; unknown countries get a generic block,
//! never an error.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// Countries with a dedicated framework block, paired with their text.
static COUNTRIES: &[(&str, &str)] = &[
    ("Ecuador", ECUADOR_FRAMEWORK),
    ("Colombia", COLOMBIA_FRAMEWORK),
    ("Perú", PERU_FRAMEWORK),
    ("México", MEXICO_FRAMEWORK),
];

static FRAMEWORKS: Lazy<BTreeMap<String, &'static str>> = Lazy::new(|| {
    COUNTRIES
        .iter()
        .map(|(name, framework)| (normalize(name), *framework))
        .collect()
});

/// Returns the legal-framework block for a country.
///
/// Exact text per known country; the generic block for anything else
/// (including empty input). Never fails.
pub fn legal_framework(country: &str) -> &'static str {
    FRAMEWORKS
        .get(normalize(country).as_str())
        .copied()
        .unwrap_or(GENERIC_FRAMEWORK)
}

/// Canonical names of the countries with a dedicated block, in registry order.
pub fn supported_countries() -> impl Iterator<Item = &'static str> {
    COUNTRIES.iter().map(|(name, _)| *name)
}

/// Folds casing and Spanish diacritics so "Perú", "peru" and "PERÚ" match.
fn normalize(country: &str) -> String {
    country
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

// ============================================================================
// Framework blocks
// ============================================================================

const ECUADOR_FRAMEWORK: &str = r#"### Marco normativo aplicable: Ecuador

La contratación pública se rige por la Ley Orgánica del Sistema Nacional de Contratación Pública (LOSNCP) y su Reglamento General, bajo la rectoría del SERCOP (Servicio Nacional de Contratación Pública).

Puntos de control al analizar documentos:
- Los procedimientos se publican y tramitan en el portal de Compras Públicas (SOCE); verificar que el procedimiento citado exista y corresponda al tipo de contratación (subasta inversa electrónica, licitación, cotización, menor cuantía, régimen especial).
- Los oferentes deben constar con RUC activo y estar habilitados en el RUP (Registro Único de Proveedores); un RUC inválido o no habilitado es causal de rechazo.
- Garantías habituales: fiel cumplimiento (5% del valor del contrato), buen uso del anticipo (100% del anticipo) y garantía técnica cuando aplica (arts. 73 a 76 LOSNCP).
- Revisar plazos de preguntas, respuestas y convalidación de errores; su omisión es vicio frecuente en pliegos.
- Montos y presupuesto referencial se expresan en dólares estadounidenses (USD)."#;

const COLOMBIA_FRAMEWORK: &str = r#"### Marco normativo aplicable: Colombia

La contratación estatal se rige por la Ley 80 de 1993 (Estatuto General de Contratación), la Ley 1150 de 2007 y sus decretos reglamentarios, con Colombia Compra Eficiente como ente rector.

Puntos de control al analizar documentos:
- Los procesos se tramitan en el SECOP II; verificar modalidad (licitación pública, selección abreviada, concurso de méritos, mínima cuantía o contratación directa) y su justificación.
- Los proponentes acreditan experiencia y capacidad mediante el RUP (Registro Único de Proponentes) expedido por la cámara de comercio.
- Garantía de seriedad de la oferta exigible desde la presentación; en ejecución, cumplimiento, anticipo, salarios y prestaciones, y responsabilidad extracontractual según el riesgo.
- Para infraestructura aplican los pliegos tipo obligatorios; desviaciones frente al documento tipo son hallazgo relevante.
- Revisar la matriz de riesgos exigida por los documentos del proceso y su asignación entre entidad y contratista."#;

const PERU_FRAMEWORK: &str = r#"### Marco normativo aplicable: Perú

La contratación pública se rige por la Ley N.º 30225, Ley de Contrataciones del Estado, y su Reglamento, bajo supervisión del OSCE (Organismo Supervisor de las Contrataciones del Estado).

Puntos de control al analizar documentos:
- Los procedimientos se registran en el SEACE; verificar el tipo de procedimiento (licitación pública, concurso público, adjudicación simplificada, subasta inversa electrónica, comparación de precios).
- Los postores deben contar con inscripción vigente en el RNP (Registro Nacional de Proveedores) en el capítulo correspondiente.
- Garantía de fiel cumplimiento por el 10% del monto del contrato; garantía por adelantos cuando se otorgan.
- Revisar los factores de evaluación y su puntaje frente a las bases estándar aprobadas por el OSCE.
- Atender los plazos de consultas, observaciones e integración de bases; su incumplimiento vicia el procedimiento."#;

const MEXICO_FRAMEWORK: &str = r#"### Marco normativo aplicable: México

Las adquisiciones y servicios del sector público federal se rigen por la LAASSP (Ley de Adquisiciones, Arrendamientos y Servicios del Sector Público) y la obra pública por la LOPSRM, con procedimientos publicados en CompraNet.

Puntos de control al analizar documentos:
- Verificar la modalidad: licitación pública, invitación a cuando menos tres personas o adjudicación directa, y que el supuesto de excepción esté fundado y motivado.
- Revisar la convocatoria y las juntas de aclaraciones; las modificaciones derivadas forman parte de las bases.
- Garantía de cumplimiento conforme a la convocatoria y, en su caso, garantía del anticipo por el 100% del monto anticipado.
- Los licitantes manifiestan no encontrarse en los supuestos de los artículos 50 y 60 de la LAASSP.
- Las entidades federativas cuentan con leyes locales análogas; confirmar qué régimen aplica al documento."#;

const GENERIC_FRAMEWORK: &str = r#"### Marco normativo aplicable: contratación pública (general)

No se cuenta con un marco legal específico para este país, así que aplica los principios generales de la contratación pública: transparencia, publicidad, igualdad de trato entre oferentes, libre concurrencia y planeación.

Puntos de control al analizar documentos:
- Verificar que el procedimiento, sus plazos y sus criterios de evaluación estén definidos con claridad y sin ambigüedades.
- Revisar requisitos de registro o habilitación de proveedores y la vigencia de la documentación exigida.
- Identificar las garantías exigidas (seriedad de la oferta, cumplimiento, anticipo) y si sus montos y vigencias son razonables.
- Señalar cláusulas inusuales, restricciones a la competencia o condiciones que favorezcan a un oferente específico.
- Recomendar la verificación del régimen legal concreto del país antes de tomar decisiones definitivas."#;
