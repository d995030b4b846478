//! Final BMI report with per-category advice.

use crate::percentile::Category;

/// Values shown in the report. All of them are validated before rendering.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub bmi: f64,
    pub age: u8,
    pub weight_kg: f64,
    pub height_m: f64,
    pub category: Category,
    pub name: Option<&'a str>,
}

/// Render the summary block followed by the advice for the category.
pub fn render(input: &ReportInput<'_>) -> String {
    let height_cm = (input.height_m * 100.0).round() as u32;
    let header = match input.name {
        Some(name) => format!(
            "\n📋 {name}, este es el resultado para tu niño/a de {} años:\n",
            input.age
        ),
        None => format!("\n📋 Resultado para niño/a de {} años:\n", input.age),
    };

    let summary = format!(
        "{header}\
         • Peso: {weight} kg\n\
         • Estatura: {height_cm} cm\n\
         • IMC: {bmi:.2}\n\
         • Categoría: {category}\n\n\
         👶 Para tu pequeño de {age} años ({weight}kg, {height_cm}cm):\n\n",
        weight = input.weight_kg,
        bmi = input.bmi,
        category = input.category.label().to_uppercase(),
        age = input.age,
    );

    summary + advice(input.category)
}

/// Static advice block for a category.
pub fn advice(category: Category) -> &'static str {
    match category {
        Category::Underweight => {
            "⭐ Consejos prácticos:\n\
             1. Consulta con el pediatra para descartar causas médicas o nutricionales.\n\
             2. Ofrécele comidas pequeñas, frecuentes y ricas en nutrientes.\n\
             3. Añade alimentos con calorías saludables como aceite de oliva, palta o \
             frutos secos molidos.\n\n\
             💡 Recuerda: Cada niño crece a su propio ritmo."
        }
        Category::NormalWeight => {
            "✅ ¡Buen trabajo! Sigue promoviendo estos hábitos:\n\
             1. Dieta equilibrada rica en frutas, verduras y agua.\n\
             2. Tiempo activo diario: jugar, correr o bailar.\n\
             3. Limitar el consumo de azúcar y comida procesada.\n\n\
             💡 Consejo: La prevención empieza con buenos hábitos."
        }
        Category::OverweightRisk => {
            "📉 Riesgo de sobrepeso:\n\
             1. Reduce azúcares, golosinas y frituras.\n\
             2. Aumenta la actividad física: mínimo 60 minutos al día.\n\
             3. No forzar a comer, pero establecer horarios regulares.\n\n\
             💡 Consejo: Dar ejemplo desde casa ayuda mucho."
        }
        Category::Obesity => {
            "🚨 Atención: El niño presenta obesidad.\n\
             1. Acude a un pediatra o nutricionista.\n\
             2. Haz cambios familiares: comida saludable y más actividad.\n\
             3. Refuerza con amor y apoyo, sin etiquetar ni culpar.\n\n\
             💡 Tip: No hagas dietas estrictas sin guía médica."
        }
    }
}
