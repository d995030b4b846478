//! User-facing copy for the intake conversation.
//!
//! Intermediate prompts may come in several equivalent phrasings; which one is
//! shown is decided by an injected [`PromptChooser`].

use rand::Rng;

use crate::error::TableError;
use crate::intake::Sex;
use crate::percentile::Category;

/// Picks one of `options` equivalent phrasings.
pub trait PromptChooser: Send + Sync {
    /// Return an index in `0..options`. `options` is never zero.
    fn choose(&self, options: usize) -> usize;
}

/// Uniformly random phrasing.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomChooser;

impl PromptChooser for RandomChooser {
    fn choose(&self, options: usize) -> usize {
        rand::thread_rng().gen_range(0..options)
    }
}

/// Always the same phrasing (wrapped into range). Used for deterministic output.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedChooser(pub usize);

impl PromptChooser for FixedChooser {
    fn choose(&self, options: usize) -> usize {
        self.0 % options
    }
}

pub fn welcome() -> String {
    "👋 ¡Hola! Soy tu asistente de IMC para niñas y niños.\n\nPara empezar, ¿cómo te llamas?"
        .to_string()
}

pub fn restarted() -> String {
    "🔄 Comenzamos de nuevo... ¿Cómo te llamas?".to_string()
}

pub fn nothing_received() -> String {
    "No recibí nada 😅. Por favor, escribe un dato válido.".to_string()
}

pub fn name_too_long(max_chars: usize) -> String {
    format!("✏️ Ese nombre es muy largo. Usa como máximo {max_chars} caracteres.")
}

pub fn ask_age(name: &str) -> String {
    format!("😊 ¡Mucho gusto, {name}! ¿Qué edad tiene el menor? (en años, ej: 5)")
}

pub fn age_not_a_number() -> String {
    "⚠️ Edad no válida. Usa solo números (ej: 5).".to_string()
}

pub fn age_out_of_range(min: u8, max: u8) -> String {
    format!("📆 Ingresa una edad entre {min} y {max} años.")
}

/// Equivalent phrasings of the sex question.
pub fn ask_sex(name: &str, chooser: &dyn PromptChooser) -> String {
    let variants = [
        format!("👦 {name}, ¿cuál es el sexo del menor? (escribe 'niño' o 'niña')"),
        format!("👧 Gracias, {name}. ¿Es niño o niña?"),
        format!("🚻 Perfecto, {name}. Ahora dime el sexo del menor: 'niño' o 'niña'."),
    ];
    let idx = chooser.choose(variants.len()).min(variants.len() - 1);
    variants[idx].clone()
}

pub fn sex_not_recognized() -> String {
    "🚻 Por favor, responde con 'niño' o 'niña'.".to_string()
}

pub fn ask_weight(name: &str) -> String {
    format!("⚖️ {name}, ¿cuánto pesa el menor? (en kg, ej: 15.2)")
}

pub fn weight_not_a_number() -> String {
    "🚫 Peso no válido. Usa números como 15.5.".to_string()
}

pub fn weight_out_of_range(max_kg: f64) -> String {
    format!("⚠️ Peso fuera de rango. Ingresa un número realista (más de 0 y hasta {max_kg} kg).")
}

pub fn confirm_young_weight(weight_kg: f64, age: u8) -> String {
    format!(
        "🤔 {weight_kg} kg es un peso alto para un menor de {age} años. \
         Si el dato es correcto, vuelve a enviarlo para confirmarlo."
    )
}

pub fn ask_height(name: &str) -> String {
    format!("📏 {name}, ¿cuál es su talla? (en metros, ej: 1.10)")
}

pub fn height_not_a_number() -> String {
    "🚫 Talla no válida. Usa formato como 1.20".to_string()
}

pub fn height_out_of_range() -> String {
    "📐 Talla no válida. Ej: 1.15".to_string()
}

pub fn centimeters_converted(raw: f64, height_m: f64) -> String {
    format!("ℹ️ Interpreté {raw} como centímetros: {height_m:.2} m.\n\n")
}

/// Message for each table failure; each cause keeps its own wording.
pub fn table_error(err: &TableError) -> String {
    match err {
        TableError::NotFound { .. } => {
            "❌ Error: No se encontró el archivo de tabla de percentiles (tablas_percentiles.json)."
                .to_string()
        }
        TableError::Malformed { .. } => {
            "❌ Error: El archivo de percentiles tiene un formato JSON inválido.".to_string()
        }
        TableError::PermissionDenied { .. } => {
            "❌ Error: No se tienen permisos para leer el archivo de percentiles.".to_string()
        }
        TableError::Unreadable { .. } => {
            "❌ Error: No se pudo leer el archivo de percentiles. Intenta enviar la talla de nuevo."
                .to_string()
        }
    }
}

pub fn no_percentile_data(sex: Sex, age: u8) -> String {
    format!(
        "📊 No hay datos de percentiles para {sex} de {age} años. Solo disponible para edades 1-18."
    )
}

pub fn result_headline(bmi: f64, category: Category) -> String {
    format!(
        "✅ El IMC del menor es: {bmi:.2} y se encuentra en la categoría: *{}*.\n\n",
        category.label().to_uppercase()
    )
}

pub fn offer_another() -> String {
    "\n\n🔁 ¿Deseas calcular otro IMC? Escribe 'reiniciar'.".to_string()
}

pub fn still_waiting() -> String {
    "🤖 Aún estoy esperando el dato anterior. Si te confundiste, escribe 'reiniciar'.".to_string()
}

/// Appended to an error message once the same slot failed repeatedly.
pub fn restart_hint() -> String {
    "\n\n💡 ¿Se complicó? Escribe 'reiniciar' para empezar de nuevo.".to_string()
}
